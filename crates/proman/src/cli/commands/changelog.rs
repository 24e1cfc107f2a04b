//! Changelog command

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Subcommand};
use serde_json::json;
use tracing::{debug, info};

use proman_changelog::{ChangelogAssembler, ChangelogStore, ConventionalParser};
use proman_core::config::Config;
use proman_core::ProManError;
use proman_git::{GitRepo, VersionLookup};
use proman_protocol::ProtocolDocument;
use proman_strategies::VersionResolver;

use super::load_workspace;
use crate::cli::output::{self, RunReport};
use crate::cli::{Cli, OutputFormat};

/// Maintain the JSON changelog
#[derive(Debug, Subcommand)]
pub enum ChangelogCommand {
    /// Record a protocol's completed tasks in the ongoing changelog record
    Update(UpdateArgs),

    /// Seal the ongoing record as a release
    Finalize(FinalizeArgs),
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Protocol document holding the tasklist
    #[arg(long, value_name = "FILE")]
    pub protocol: PathBuf,

    /// Keep only public entries, filed under the pre-release channel
    #[arg(long)]
    pub prerelease: bool,

    /// Issue the protocol belongs to
    #[arg(long)]
    pub issue: Option<u64>,

    /// Pull request the protocol belongs to
    #[arg(long)]
    pub pull_request: Option<u64>,

    /// Do not read the parent commit and contributors from git
    #[arg(long)]
    pub no_git: bool,

    /// Changelog file (defaults to the configured file)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FinalizeArgs {
    /// Version being released
    #[arg(long = "for-version", value_name = "VERSION")]
    pub for_version: String,

    /// Changelog file (defaults to the configured file)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Parent commit and authors since the last release
struct GitContext {
    sha: String,
    version: Option<String>,
    distance: Option<u64>,
    authors: Vec<String>,
}

impl ChangelogCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut report = RunReport::new("Changelog");
        let result = match self {
            Self::Update(args) => args.run(cli, &mut report),
            Self::Finalize(args) => args.run(cli, &mut report),
        };
        report.finish(cli.format, result)
    }
}

fn store_path(cwd: &Path, config: &Config, file: Option<&PathBuf>) -> PathBuf {
    file.cloned().unwrap_or_else(|| cwd.join(&config.changelog.file))
}

fn git_context(cwd: &Path, config: &Config) -> Result<GitContext, ProManError> {
    let repo = GitRepo::discover(cwd)?;
    let resolver = VersionResolver::new(&config.versioning);
    let (version, distance) =
        VersionLookup::new(&repo, resolver.tag_prefix()).latest("HEAD")?;
    let sha = repo.head_commit()?.id().to_string();

    let since = version.as_ref().map(|v| resolver.release_tag(v));
    let mut authors: Vec<String> = repo
        .commits_between(since.as_deref(), "HEAD")?
        .into_iter()
        .map(|commit| commit.author)
        .collect();
    authors.sort();
    authors.dedup();

    debug!(sha = %sha, authors = authors.len(), "collected git context");
    Ok(GitContext {
        sha,
        version: version.map(|v| v.to_string()),
        distance,
        authors,
    })
}

impl UpdateArgs {
    fn run(&self, cli: &Cli, report: &mut RunReport) -> anyhow::Result<()> {
        info!(
            protocol = %self.protocol.display(),
            prerelease = self.prerelease,
            "executing changelog update"
        );
        let (cwd, config) = load_workspace()?;
        let path = store_path(&cwd, &config, self.file.as_ref());

        let mut store = report.check("load changelog", ChangelogStore::load(&path))?;
        let text = report.check("read protocol", std::fs::read_to_string(&self.protocol))?;
        let document = ProtocolDocument::new(text, &config.protocol);
        let entries = report.check(
            "parse tasklist",
            document.get_tasklist(&ConventionalParser::new()),
        )?;
        let changes =
            ChangelogAssembler::from_config(&config).assemble(&entries, self.prerelease);

        let git = if self.no_git {
            None
        } else {
            Some(report.check("read git history", git_context(&cwd, &config))?)
        };

        let record = store.begin_next_cycle();
        record.update_protocol(document.text(), &entries);
        record.update_changes(changes);
        if let Some(issue) = self.issue {
            record.update_issue(json!({ "number": issue }));
        }
        if let Some(number) = self.pull_request {
            record.update_pull_request(json!({ "number": number }));
        }
        if let Some(git) = git {
            record.update_parent(&git.sha, git.version, git.distance);
            let roles: BTreeMap<String, u32> =
                [("author".to_string(), 1)].into_iter().collect();
            for author in &git.authors {
                record.update_contributor(author, false, &roles);
            }
        }

        let written = report.check("write changelog", store.write_file())?;
        print_written(cli, &path, written)
    }
}

impl FinalizeArgs {
    fn run(&self, cli: &Cli, report: &mut RunReport) -> anyhow::Result<()> {
        info!(version = %self.for_version, "executing changelog finalize");
        let (cwd, config) = load_workspace()?;
        let path = store_path(&cwd, &config, self.file.as_ref());

        let mut store = report.check("load changelog", ChangelogStore::load(&path))?;
        report.check(
            "seal release",
            store.seal_release(&self.for_version, Utc::now()).map(|_| ()),
        )?;
        let written = report.check("write changelog", store.write_file())?;
        print_written(cli, &path, written)
    }
}

fn print_written(cli: &Cli, path: &Path, written: bool) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let output = json!({ "file": path.display().to_string(), "written": written });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            if written {
                output::success(&format!(
                    "Changelog written to {}",
                    output::path_style().apply_to(path.display())
                ));
            } else {
                output::warning("Changelog unchanged");
            }
        }
    }
    Ok(())
}
