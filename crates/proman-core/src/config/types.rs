//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::template::{Template, TemplateEnv};
use crate::types::{IssueStatus, ReleaseAction};

/// Main configuration for ProMan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Branch naming configuration
    pub branches: BranchesConfig,

    /// Versioning configuration
    pub versioning: VersioningConfig,

    /// Git configuration
    pub git: GitConfig,

    /// Development protocol configuration
    pub protocol: ProtocolConfig,

    /// Conventional commit type classification
    pub commits: BTreeMap<String, CommitTypeConfig>,

    /// Changelog configuration
    pub changelog: ChangelogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: None,
            name: None,
            branches: BranchesConfig::default(),
            versioning: VersioningConfig::default(),
            git: GitConfig::default(),
            protocol: ProtocolConfig::default(),
            commits: default_commit_types(),
            changelog: ChangelogConfig::default(),
        }
    }
}

/// Branch naming configuration
///
/// Prefixes are checked in declaration order: release, pre, dev, auto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchesConfig {
    /// Name of the default branch
    pub default: String,

    /// Prefix of release branches (`release/2`)
    pub release: String,

    /// Prefix of pre-release branches (`pre/1.0.0.a1`)
    pub pre: String,

    /// Prefix of development branches (`dev/42/main`)
    pub dev: String,

    /// Prefix of automation branches (`auto/sync`)
    pub auto: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        Self {
            default: "main".to_string(),
            release: "release/".to_string(),
            pre: "pre/".to_string(),
            dev: "dev/".to_string(),
            auto: "auto/".to_string(),
        }
    }
}

/// Versioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Prefix prepended to versions when tagging (e.g., "v")
    pub tag_prefix: String,

    /// Treat 0.x as pre-1.0: major bumps become minor, minor bumps become patch
    pub zero_major_softening: bool,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "v".to_string(),
            zero_major_softening: true,
        }
    }
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote name
    pub remote: String,

    /// How many times to look for a pushed commit on the remote
    pub poll_attempts: u32,

    /// Seconds to wait between polls
    pub poll_interval_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            poll_attempts: 10,
            poll_interval_secs: 5,
        }
    }
}

/// Marker configuration of a protocol field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerSpec {
    /// Literal start and end markers
    Literal { start: String, end: String },
    /// Pattern with `{pos}` and `{id}` placeholders
    Pattern(String),
}

/// Configuration of a single protocol field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Marker override; falls back to `ProtocolConfig::marker_pattern`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerSpec>,

    /// Template for entries written into the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
}

impl FieldConfig {
    fn with_template(template: &str) -> Self {
        Self {
            marker: None,
            template: Some(Template::new(template)),
        }
    }
}

/// Development protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Default marker pattern
    pub marker_pattern: String,

    /// Word substituted for `{pos}` in start markers
    pub pos_start: String,

    /// Word substituted for `{pos}` in end markers
    pub pos_end: String,

    /// Per-field configuration keyed by field id
    pub fields: BTreeMap<String, FieldConfig>,

    /// Template for the status field content
    pub status_template: Template,

    /// Status checkboxes keyed by checkbox name; a checkbox is checked once
    /// the issue reaches the mapped status
    pub status_checkboxes: BTreeMap<String, IssueStatus>,

    /// `chrono` format of the `timestamp` template variable
    pub timestamp_format: String,

    /// Base template variables
    pub env: TemplateEnv,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("tasklist".to_string(), FieldConfig::default());
        fields.insert(
            "timeline".to_string(),
            FieldConfig::with_template("- **{{timestamp}}**: {{event}}\n"),
        );
        fields.insert(
            "references".to_string(),
            FieldConfig::with_template("- [{{title}}]({{url}})\n"),
        );
        fields.insert(
            "pr_list".to_string(),
            FieldConfig::with_template("- #{{number}} {{title}}\n"),
        );
        fields.insert("pr_title".to_string(), FieldConfig::default());
        fields.insert("status".to_string(), FieldConfig::default());

        let mut status_checkboxes = BTreeMap::new();
        status_checkboxes.insert("design".to_string(), IssueStatus::Design);
        status_checkboxes.insert("implementation".to_string(), IssueStatus::Implementation);
        status_checkboxes.insert("testing".to_string(), IssueStatus::Testing);
        status_checkboxes.insert("deploy".to_string(), IssueStatus::DeployFinal);

        Self {
            marker_pattern: "<!-- {pos}-{id} -->".to_string(),
            pos_start: "start".to_string(),
            pos_end: "end".to_string(),
            fields,
            status_template: Template::new("**{{status}}** (updated {{timestamp}})"),
            status_checkboxes,
            timestamp_format: "%Y.%m.%d %H:%M:%S".to_string(),
            env: TemplateEnv::new(),
        }
    }
}

/// Classification of a conventional commit type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTypeConfig {
    /// Release action triggered by this type; `None` for internal changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_action: Option<ReleaseAction>,

    /// Changelog channel id
    pub channel: String,

    /// Changelog section id within the channel
    pub section: String,
}

impl CommitTypeConfig {
    fn new(release_action: Option<ReleaseAction>, channel: &str, section: &str) -> Self {
        Self {
            release_action,
            channel: channel.to_string(),
            section: section.to_string(),
        }
    }
}

/// Default classification of the conventional commit types
pub fn default_commit_types() -> BTreeMap<String, CommitTypeConfig> {
    use ReleaseAction::*;

    let mut types = BTreeMap::new();
    types.insert("feat".to_string(), CommitTypeConfig::new(Some(Minor), "public", "features"));
    types.insert("fix".to_string(), CommitTypeConfig::new(Some(Patch), "public", "bug-fixes"));
    types.insert("perf".to_string(), CommitTypeConfig::new(Some(Patch), "public", "performance"));
    types.insert("revert".to_string(), CommitTypeConfig::new(Some(Patch), "public", "reverts"));
    types.insert("docs".to_string(), CommitTypeConfig::new(Some(Post), "public", "documentation"));
    types.insert("build".to_string(), CommitTypeConfig::new(Some(Post), "public", "packaging"));
    types.insert("refactor".to_string(), CommitTypeConfig::new(None, "internal", "refactoring"));
    types.insert("test".to_string(), CommitTypeConfig::new(None, "internal", "tests"));
    types.insert("ci".to_string(), CommitTypeConfig::new(None, "internal", "ci"));
    types.insert("style".to_string(), CommitTypeConfig::new(None, "internal", "style"));
    types.insert("chore".to_string(), CommitTypeConfig::new(None, "internal", "maintenance"));
    types
}

/// A changelog channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel id
    pub id: String,
    /// Human-readable title
    pub title: String,
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Path of the JSON changelog store, relative to the repository root
    pub file: PathBuf,

    /// Declared channels
    pub channels: Vec<ChannelConfig>,

    /// Channel whose entries are published in a pre-release
    pub public_channel: String,

    /// Channel that receives public entries in pre-release mode
    pub prerelease_channel: String,
}

impl ChangelogConfig {
    /// Whether a channel id is declared
    pub fn has_channel(&self, id: &str) -> bool {
        self.channels.iter().any(|c| c.id == id)
    }
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        let channel = |id: &str, title: &str| ChannelConfig {
            id: id.to_string(),
            title: title.to_string(),
        };
        Self {
            file: PathBuf::from(".github/.changelog.json"),
            channels: vec![
                channel("public", "Public"),
                channel("public-prerelease", "Public Pre-release"),
                channel("internal", "Internal"),
            ],
            public_channel: "public".to_string(),
            prerelease_channel: "public-prerelease".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sections() {
        let config = Config::default();
        assert_eq!(config.branches.default, "main");
        assert_eq!(config.versioning.tag_prefix, "v");
        assert!(config.protocol.fields.contains_key("tasklist"));
        assert_eq!(
            config.commits.get("feat").and_then(|c| c.release_action),
            Some(ReleaseAction::Minor)
        );
    }

    #[test]
    fn test_marker_spec_untagged() {
        let literal: MarkerSpec =
            serde_yaml::from_str("start: '<!-- Begin Tasks -->'\nend: '<!-- End Tasks -->'")
                .unwrap();
        assert_eq!(
            literal,
            MarkerSpec::Literal {
                start: "<!-- Begin Tasks -->".to_string(),
                end: "<!-- End Tasks -->".to_string(),
            }
        );

        let pattern: MarkerSpec = serde_yaml::from_str("'<!-- {pos} {id} -->'").unwrap();
        assert_eq!(pattern, MarkerSpec::Pattern("<!-- {pos} {id} -->".to_string()));
    }

    #[test]
    fn test_commits_default_when_absent() {
        let config: Config = toml::from_str("[versioning]\ntag_prefix = \"ver\"\n").unwrap();
        assert_eq!(config.versioning.tag_prefix, "ver");
        assert!(config.versioning.zero_major_softening);
        assert!(config.commits.contains_key("fix"));
    }
}
