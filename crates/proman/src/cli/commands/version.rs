//! Version command

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use console::style;
use serde_json::json;
use tracing::info;

use proman_changelog::{CommitClassifier, ConventionalParser};
use proman_core::config::Config;
use proman_core::{ProManError, ReleaseAction};
use proman_git::{git_push_tag, Branch, GitRepo, VersionLookup};
use proman_protocol::ProtocolDocument;
use proman_strategies::{SemanticVersion, VersionResolver};

use super::load_workspace;
use crate::cli::output::{self, RunReport};
use crate::cli::{Cli, OutputFormat};

/// Compute, look up and tag versions
#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// Compute the next release version
    Next(NextArgs),

    /// Show the latest tagged version
    Latest(LatestArgs),

    /// Compute the development build version of a head branch
    Dev(DevArgs),
}

/// Where the release action comes from
#[derive(Debug, Args)]
pub struct ActionArgs {
    /// Release action (major, minor, patch, post)
    #[arg(short, long)]
    pub action: Option<ReleaseAction>,

    /// Protocol document whose completed tasks determine the action
    #[arg(long, value_name = "FILE")]
    pub protocol: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TagArgs {
    /// Create an annotated tag for the version at HEAD
    #[arg(long)]
    pub tag: bool,

    /// Wait for HEAD to reach the remote, then tag and push the tag
    #[arg(long)]
    pub push: bool,
}

#[derive(Debug, Args)]
pub struct NextArgs {
    /// Base version (defaults to the latest release tag on --reference)
    #[arg(long)]
    pub base: Option<String>,

    /// Revision the base version is looked up from
    #[arg(long, default_value = "HEAD")]
    pub reference: String,

    #[command(flatten)]
    pub action: ActionArgs,

    #[command(flatten)]
    pub tag: TagArgs,
}

#[derive(Debug, Args)]
pub struct LatestArgs {
    /// Only consider development builds
    #[arg(long)]
    pub dev: bool,

    /// Revision to look up from
    #[arg(long, default_value = "HEAD")]
    pub reference: String,
}

#[derive(Debug, Args)]
pub struct DevArgs {
    /// Issue number (defaults to the issue of the current dev branch)
    #[arg(long)]
    pub issue: Option<u64>,

    /// Branch the build is based on (defaults to the default branch)
    #[arg(long)]
    pub base_ref: Option<String>,

    /// Branch carrying the development builds
    #[arg(long, default_value = "HEAD")]
    pub head_ref: String,

    #[command(flatten)]
    pub action: ActionArgs,

    #[command(flatten)]
    pub tag: TagArgs,
}

impl VersionCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut report = RunReport::new("Version");
        let result = match self {
            Self::Next(args) => args.run(cli, &mut report),
            Self::Latest(args) => args.run(cli),
            Self::Dev(args) => args.run(cli, &mut report),
        };
        report.finish(cli.format, result)
    }
}

impl ActionArgs {
    /// Explicit action, else the highest action of the protocol's tasklist
    fn resolve(
        &self,
        config: &Config,
        report: &mut RunReport,
    ) -> anyhow::Result<Option<ReleaseAction>> {
        if self.action.is_some() {
            return Ok(self.action);
        }
        let Some(path) = &self.protocol else {
            return Ok(None);
        };

        let text = report.check("read protocol", std::fs::read_to_string(path))?;
        let document = ProtocolDocument::new(text, &config.protocol);
        let entries = report.check(
            "parse tasklist",
            document.get_tasklist(&ConventionalParser::new()),
        )?;
        Ok(CommitClassifier::new(&config.commits).release_action(&entries))
    }
}

impl TagArgs {
    fn requested(&self) -> bool {
        self.tag || self.push
    }

    /// Tag HEAD, first waiting for it to reach the remote when pushing
    fn apply(
        &self,
        cwd: &Path,
        config: &Config,
        tag: &str,
        report: &mut RunReport,
    ) -> anyhow::Result<()> {
        let repo = report.check(
            "open repository",
            GitRepo::discover(cwd).map_err(ProManError::from),
        )?;
        let head = report.check(
            "resolve HEAD",
            repo.head_commit()
                .map(|c| c.id().to_string())
                .map_err(ProManError::from),
        )?;

        if self.push {
            let interval = Duration::from_secs(config.git.poll_interval_secs);
            report.check(
                "commit on remote",
                repo.wait_for_remote_commit(
                    &config.git.remote,
                    &head,
                    config.git.poll_attempts,
                    interval,
                )
                .map_err(ProManError::from),
            )?;
        }

        let message = format!("Release {}", tag);
        report.check(
            "create tag",
            repo.create_tag(tag, &head, Some(&message)).map_err(ProManError::from),
        )?;

        if self.push {
            report.check(
                "push tag",
                git_push_tag(repo.path(), &config.git.remote, tag).map_err(ProManError::from),
            )?;
        }
        Ok(())
    }
}

impl NextArgs {
    fn run(&self, cli: &Cli, report: &mut RunReport) -> anyhow::Result<()> {
        info!(base = ?self.base, action = ?self.action.action, "executing version next");
        let (cwd, config) = load_workspace()?;
        let resolver = VersionResolver::new(&config.versioning);

        let base = match &self.base {
            Some(raw) => report.check(
                "parse base version",
                SemanticVersion::parse(raw).map_err(ProManError::from),
            )?,
            None => {
                let repo = report.check(
                    "open repository",
                    GitRepo::discover(&cwd).map_err(ProManError::from),
                )?;
                let lookup = VersionLookup::new(&repo, resolver.tag_prefix());
                let (latest, _) = report.check(
                    "look up latest release",
                    lookup.latest(&self.reference).map_err(ProManError::from),
                )?;
                latest.unwrap_or_else(|| SemanticVersion::new(0, 0, 0))
            }
        };

        let Some(action) = self.action.resolve(&config, report)? else {
            return print_no_release(cli, &base);
        };

        let next = report.check("compute next version", resolver.next_version(&base, action))?;
        let tag = resolver.release_tag(&next);
        if self.tag.requested() {
            self.tag.apply(&cwd, &config, &tag, report)?;
        }

        match cli.format {
            OutputFormat::Json => {
                let output = json!({
                    "current": base.to_string(),
                    "next": next.to_string(),
                    "action": action.as_str(),
                    "tag": tag,
                    "tagged": self.tag.requested(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", next);
                } else {
                    println!("{}", output::header("Version Calculation"));
                    println!();
                    println!("  Current version: {}", style(&base).cyan());
                    println!("  Next version:    {}", output::version_style().apply_to(&next));
                    println!("  Release action:  {}", style(action).yellow());
                    println!("  Tag:             {}", output::tag_style().apply_to(&tag));
                    if self.tag.requested() {
                        println!();
                        output::success(&format!("Created tag {}", tag));
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_no_release(cli: &Cli, base: &SemanticVersion) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let output = json!({ "current": base.to_string(), "next": null });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::warning("Only internal changes, no release required");
            }
        }
    }
    Ok(())
}

impl LatestArgs {
    fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(dev = self.dev, reference = %self.reference, "executing version latest");
        let (cwd, config) = load_workspace()?;
        let resolver = VersionResolver::new(&config.versioning);
        let repo = GitRepo::discover(&cwd).map_err(ProManError::from)?;
        let lookup = VersionLookup::new(&repo, resolver.tag_prefix());

        let (version, distance) = if self.dev {
            (lookup.latest_dev(&self.reference).map_err(ProManError::from)?, None)
        } else {
            lookup.latest(&self.reference).map_err(ProManError::from)?
        };

        match cli.format {
            OutputFormat::Json => {
                let output = json!({
                    "version": version.as_ref().map(ToString::to_string),
                    "tag": version.as_ref().map(|v| resolver.release_tag(v)),
                    "distance": distance,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => match &version {
                Some(version) if cli.quiet => println!("{}", version),
                Some(version) => {
                    println!("  Version: {}", output::version_style().apply_to(version));
                    println!(
                        "  Tag:     {}",
                        output::tag_style().apply_to(resolver.release_tag(version))
                    );
                    if let Some(distance) = distance {
                        println!("  Commits since tag: {}", distance);
                    }
                }
                None => {
                    if !cli.quiet {
                        output::warning("No matching version tag found");
                    }
                }
            },
        }
        Ok(())
    }
}

impl DevArgs {
    fn run(&self, cli: &Cli, report: &mut RunReport) -> anyhow::Result<()> {
        info!(issue = ?self.issue, head_ref = %self.head_ref, "executing version dev");
        let (cwd, config) = load_workspace()?;
        let resolver = VersionResolver::new(&config.versioning);
        let repo = report.check(
            "open repository",
            GitRepo::discover(&cwd).map_err(ProManError::from),
        )?;

        let issue = match self.issue {
            Some(issue) => issue,
            None => {
                let name = repo
                    .current_branch()
                    .map_err(ProManError::from)?
                    .ok_or_else(|| anyhow::anyhow!("HEAD is detached; pass --issue"))?;
                let branch = report.check(
                    "classify branch",
                    Branch::resolve(&name, &config.branches).map_err(ProManError::from),
                )?;
                branch
                    .dev_target()
                    .map(|(issue, _)| issue)
                    .ok_or_else(|| anyhow::anyhow!("'{}' is not a dev branch; pass --issue", name))?
            }
        };

        let lookup = VersionLookup::new(&repo, resolver.tag_prefix());
        let base_ref = self.base_ref.as_deref().unwrap_or(&config.branches.default);
        let (base, _) = report.check(
            "look up base version",
            lookup.latest(base_ref).map_err(ProManError::from),
        )?;
        let base = base.unwrap_or_else(|| SemanticVersion::new(0, 0, 0));
        let head_dev = report.check(
            "look up dev builds",
            lookup.latest_dev(&self.head_ref).map_err(ProManError::from),
        )?;

        let action = self.action.resolve(&config, report)?;
        let version = report.check(
            "compute dev version",
            resolver.next_dev_version(&base, head_dev.as_ref(), action, issue),
        )?;
        let tag = resolver.release_tag(&version);
        if self.tag.requested() {
            self.tag.apply(&cwd, &config, &tag, report)?;
        }

        match cli.format {
            OutputFormat::Json => {
                let output = json!({
                    "base": base.to_string(),
                    "previous": head_dev.as_ref().map(ToString::to_string),
                    "version": version.to_string(),
                    "tag": tag,
                    "issue": issue,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", tag);
                } else {
                    println!("{}", output::header("Development Build"));
                    println!();
                    println!("  Base version: {}", style(&base).cyan());
                    println!("  Issue:        #{}", issue);
                    println!("  Dev version:  {}", output::version_style().apply_to(&version));
                    println!("  Tag:          {}", output::tag_style().apply_to(&tag));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_next_args() {
        let cli = Cli::try_parse_from([
            "proman", "version", "next", "--base", "0.3.1", "-a", "major", "--push",
        ])
        .unwrap();
        let crate::cli::Commands::Version(VersionCommand::Next(args)) = cli.command else {
            panic!("expected version next");
        };
        assert_eq!(args.base.as_deref(), Some("0.3.1"));
        assert_eq!(args.action.action, Some(ReleaseAction::Major));
        assert!(args.tag.requested());
    }

    #[test]
    fn test_explicit_action_wins() {
        let config = Config::default();
        let mut report = RunReport::new("test");
        let args = ActionArgs {
            action: Some(ReleaseAction::Patch),
            protocol: Some(PathBuf::from("does-not-exist.md")),
        };
        assert_eq!(args.resolve(&config, &mut report).unwrap(), Some(ReleaseAction::Patch));
        assert!(report.checks().is_empty());
    }

    #[test]
    fn test_action_from_protocol() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("issue.md");
        std::fs::write(
            &path,
            "<!-- start-tasklist -->\n- [X] fix: a\n- [X] feat: b\n- [ ] feat!: c\n<!-- end-tasklist -->\n",
        )
        .unwrap();

        let config = Config::default();
        let mut report = RunReport::new("test");
        let args = ActionArgs {
            action: None,
            protocol: Some(path),
        };
        assert_eq!(args.resolve(&config, &mut report).unwrap(), Some(ReleaseAction::Minor));
        assert!(report.passed());
    }
}
