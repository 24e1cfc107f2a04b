//! Branch command

use clap::Args;
use console::style;
use tracing::info;

use proman_core::ProManError;
use proman_git::{Branch, BranchSuffix};

use super::load_workspace;
use crate::cli::{Cli, OutputFormat};

/// Classify a branch name against the configured prefixes
#[derive(Debug, Args)]
pub struct BranchCommand {
    /// Branch name (defaults to the current branch)
    pub name: Option<String>,
}

impl BranchCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(name = ?self.name, "executing branch command");
        let (cwd, config) = load_workspace()?;

        let name = match &self.name {
            Some(name) => name.clone(),
            None => proman_git::GitRepo::discover(&cwd)
                .and_then(|repo| repo.current_branch())
                .map_err(ProManError::from)?
                .ok_or_else(|| anyhow::anyhow!("HEAD is detached; pass a branch name"))?,
        };

        let branch = Branch::resolve(&name, &config.branches).map_err(ProManError::from)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&branch)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", branch.kind);
                    return Ok(());
                }
                println!("{}", style(&branch.name).bold());
                println!("  Type:   {}", style(branch.kind).yellow());
                if let Some(prefix) = &branch.prefix {
                    println!("  Prefix: {}", prefix);
                }
                match &branch.suffix {
                    BranchSuffix::None => {}
                    BranchSuffix::Major(major) => println!("  Major:  {}", major),
                    BranchSuffix::Version(version) => {
                        println!("  Version: {}", style(version).green())
                    }
                    BranchSuffix::Dev { issue, target } => {
                        println!("  Issue:  #{}", issue);
                        println!("  Target: {}", target);
                    }
                    BranchSuffix::Raw(raw) => println!("  Suffix: {}", raw),
                }
            }
        }
        Ok(())
    }
}
