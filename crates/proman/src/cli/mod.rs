//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    BranchCommand, ChangelogCommand, InitCommand, ProtocolCommand, ValidateCommand, VersionCommand,
};

/// ProMan - Repository automation for branches, versions and changelogs
#[derive(Debug, Parser)]
#[command(name = "proman")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default ProMan configuration
    Init(InitCommand),

    /// Classify a branch name
    Branch(BranchCommand),

    /// Compute, look up and tag versions
    #[command(subcommand)]
    Version(VersionCommand),

    /// Read and update development protocol documents
    #[command(subcommand)]
    Protocol(ProtocolCommand),

    /// Maintain the JSON changelog
    #[command(subcommand)]
    Changelog(ChangelogCommand),

    /// Validate configuration and repository state
    Validate(ValidateCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Branch(ref cmd) => cmd.execute(&self),
            Commands::Version(ref cmd) => cmd.execute(&self),
            Commands::Protocol(ref cmd) => cmd.execute(&self),
            Commands::Changelog(ref cmd) => cmd.execute(&self),
            Commands::Validate(ref cmd) => cmd.execute(&self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli =
            Cli::try_parse_from(["proman", "--format", "json", "-v", "branch", "release/3"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Branch(_)));
    }

    #[test]
    fn test_parse_changelog_finalize() {
        let cli =
            Cli::try_parse_from(["proman", "changelog", "finalize", "--for-version", "1.0.0"])
                .unwrap();
        match cli.command {
            Commands::Changelog(ChangelogCommand::Finalize(args)) => {
                assert_eq!(args.for_version, "1.0.0");
                assert!(args.file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
