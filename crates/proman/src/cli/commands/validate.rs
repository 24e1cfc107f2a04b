//! Validate command

use clap::Args;
use tracing::info;

use proman_core::config::{find_config, load_config, Config};
use proman_git::{Branch, GitRepo};

use crate::cli::output::{self, RunReport};
use crate::cli::{Cli, OutputFormat};

/// Validate configuration and repository state
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Only validate the configuration file
    #[arg(long)]
    pub config_only: bool,
}

impl ValidateCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(config_only = self.config_only, "executing validate command");
        let cwd = std::env::current_dir()?;
        let mut report = RunReport::new("Validation Results");

        let config = match find_config(&cwd) {
            Some(path) => {
                report.pass("config file", Some(path.display().to_string()));
                report.check("config valid", load_config(&path)).ok()
            }
            None => {
                report.pass("config file", Some("none found, using defaults".to_string()));
                Some(Config::default())
            }
        };

        if !self.config_only {
            self.check_repository(&cwd, config.as_ref(), &mut report);
        }

        if !(cli.quiet && report.passed()) {
            report.print(cli.format)?;
        }
        if cli.format == OutputFormat::Text && !cli.quiet && report.passed() {
            println!();
            output::success("Validation passed");
        }

        if !report.passed() {
            let failed = report.checks().iter().filter(|c| !c.passed).count();
            anyhow::bail!("Validation failed with {} error(s)", failed);
        }
        Ok(())
    }

    fn check_repository(
        &self,
        cwd: &std::path::Path,
        config: Option<&Config>,
        report: &mut RunReport,
    ) {
        let repo = match report.check("git repository", GitRepo::discover(cwd)) {
            Ok(repo) => repo,
            Err(_) => return,
        };
        let Some(config) = config else {
            return;
        };

        match repo.remotes() {
            Ok(remotes) if remotes.iter().any(|r| r == &config.git.remote) => {
                report.pass("remote", Some(config.git.remote.clone()));
            }
            Ok(_) => report.fail("remote", format!("remote '{}' not found", config.git.remote)),
            Err(e) => report.fail("remote", e.to_string()),
        }

        match repo.current_branch() {
            Ok(Some(name)) => match Branch::resolve(&name, &config.branches) {
                Ok(branch) => report.pass("branch", Some(format!("{} ({})", name, branch.kind))),
                Err(e) => report.fail("branch", e.to_string()),
            },
            Ok(None) => report.pass("branch", Some("HEAD is detached".to_string())),
            Err(e) => report.fail("branch", e.to_string()),
        }
    }
}
