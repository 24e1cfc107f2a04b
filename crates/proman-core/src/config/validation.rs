//! Configuration validation

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::template::Template;

use super::types::{Config, MarkerSpec};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_branches(config)?;
    validate_versioning(config)?;
    validate_git(config)?;
    validate_protocol(config)?;
    validate_changelog(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> crate::error::ProManError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
    .into()
}

fn validate_branches(config: &Config) -> Result<()> {
    let branches = &config.branches;
    if branches.default.trim().is_empty() {
        return Err(invalid("branches.default", "default branch cannot be empty"));
    }

    let prefixes = [
        ("branches.release", &branches.release),
        ("branches.pre", &branches.pre),
        ("branches.dev", &branches.dev),
        ("branches.auto", &branches.auto),
    ];

    let mut seen = HashSet::new();
    for (field, prefix) in prefixes {
        if prefix.is_empty() {
            return Err(invalid(field, "prefix cannot be empty"));
        }
        if !seen.insert(prefix.as_str()) {
            return Err(invalid(field, format!("prefix '{}' is used twice", prefix)));
        }
    }

    Ok(())
}

fn validate_versioning(config: &Config) -> Result<()> {
    if config
        .versioning
        .tag_prefix
        .chars()
        .any(char::is_whitespace)
    {
        return Err(invalid(
            "versioning.tag_prefix",
            "tag prefix cannot contain whitespace",
        ));
    }
    Ok(())
}

fn validate_git(config: &Config) -> Result<()> {
    if config.git.remote.is_empty() {
        return Err(invalid("git.remote", "remote cannot be empty"));
    }
    if config.git.poll_attempts == 0 {
        return Err(invalid("git.poll_attempts", "must be at least 1"));
    }
    Ok(())
}

fn validate_template(field: &str, template: &Template) -> Result<()> {
    template
        .placeholders()
        .map(|_| ())
        .map_err(|e| invalid(field, e.to_string()))
}

fn validate_protocol(config: &Config) -> Result<()> {
    let protocol = &config.protocol;

    if !protocol.marker_pattern.contains("{pos}") || !protocol.marker_pattern.contains("{id}") {
        return Err(invalid(
            "protocol.marker_pattern",
            "must contain {pos} and {id} placeholders",
        ));
    }
    if protocol.pos_start.is_empty() || protocol.pos_start == protocol.pos_end {
        return Err(invalid(
            "protocol.pos_start",
            "start and end position words must be non-empty and distinct",
        ));
    }

    for (id, field) in &protocol.fields {
        match &field.marker {
            Some(MarkerSpec::Literal { start, end }) => {
                if start.is_empty() || end.is_empty() || start == end {
                    return Err(invalid(
                        format!("protocol.fields.{}.marker", id),
                        "literal markers must be non-empty and distinct",
                    ));
                }
            }
            Some(MarkerSpec::Pattern(pattern)) => {
                if !pattern.contains("{pos}") {
                    return Err(invalid(
                        format!("protocol.fields.{}.marker", id),
                        "marker pattern must contain {pos}",
                    ));
                }
            }
            None => {}
        }
        if let Some(template) = &field.template {
            validate_template(&format!("protocol.fields.{}.template", id), template)?;
        }
    }

    validate_template("protocol.status_template", &protocol.status_template)?;
    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    let changelog = &config.changelog;

    for (field, channel) in [
        ("changelog.public_channel", &changelog.public_channel),
        ("changelog.prerelease_channel", &changelog.prerelease_channel),
    ] {
        if !changelog.has_channel(channel) {
            return Err(invalid(field, format!("channel '{}' is not declared", channel)));
        }
    }

    for (commit_type, type_config) in &config.commits {
        if !changelog.has_channel(&type_config.channel) {
            return Err(invalid(
                format!("commits.{}.channel", commit_type),
                format!("channel '{}' is not declared", type_config.channel),
            ));
        }
        if type_config.section.is_empty() {
            return Err(invalid(
                format!("commits.{}.section", commit_type),
                "section cannot be empty",
            ));
        }
    }

    Ok(())
}
