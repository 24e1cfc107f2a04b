//! Protocol command

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use console::style;
use serde_json::json;
use tracing::info;

use proman_changelog::ConventionalParser;
use proman_core::config::Config;
use proman_core::{IssueStatus, TemplateEnv};
use proman_protocol::{tasklist, toggle_checkbox, ProtocolDocument, TaskEntry};

use super::load_workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Read and update development protocol documents
#[derive(Debug, Subcommand)]
pub enum ProtocolCommand {
    /// Print the tasklist, optionally marking tasks complete
    Tasklist(TasklistArgs),

    /// Set the status field and recompute the status checkboxes
    Status(StatusArgs),

    /// Check or uncheck the single checkbox inside a field
    Toggle(ToggleArgs),

    /// Append a rendered entry to a templated field
    Append(AppendArgs),

    /// Replace the pull request title field
    Title(TitleArgs),
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Markdown file holding the protocol
    pub file: PathBuf,

    /// Write changes back to the file instead of printing the document
    #[arg(short, long)]
    pub in_place: bool,
}

#[derive(Debug, Args)]
pub struct TasklistArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Mark the top-level task with this summary complete (repeatable)
    #[arg(long = "complete", value_name = "SUMMARY")]
    pub complete: Vec<String>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// New status (e.g. implementation, deploy-final)
    pub status: IssueStatus,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Field id, e.g. status_checkbox.design
    pub field: String,

    /// Uncheck instead of check
    #[arg(long)]
    pub uncheck: bool,
}

/// Fields that accept appended entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppendField {
    Timeline,
    References,
    PrList,
}

#[derive(Debug, Args)]
pub struct AppendArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Field to append to
    pub field: AppendField,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct TitleArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// New title
    pub title: String,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

impl ProtocolCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (_, config) = load_workspace()?;
        match self {
            Self::Tasklist(args) => args.run(cli, &config),
            Self::Status(args) => {
                info!(status = %args.status, "executing protocol status");
                let env: TemplateEnv = args.vars.iter().cloned().collect();
                args.document
                    .mutate(cli, &config, |doc| Ok(doc.update_status(args.status, &env)?))
            }
            Self::Toggle(args) => {
                info!(field = %args.field, uncheck = args.uncheck, "executing protocol toggle");
                args.document.mutate(cli, &config, |doc| {
                    let current = doc.get_data(&args.field)?.to_string();
                    let toggled = toggle_checkbox(&current, !args.uncheck);
                    Ok(doc.add_data(&args.field, &toggled, true)?)
                })
            }
            Self::Append(args) => {
                info!(field = ?args.field, "executing protocol append");
                let env: TemplateEnv = args.vars.iter().cloned().collect();
                args.document.mutate(cli, &config, |doc| {
                    Ok(match args.field {
                        AppendField::Timeline => doc.add_timeline_entry(&env)?,
                        AppendField::References => doc.add_reference(&env)?,
                        AppendField::PrList => doc.add_pr_list_entry(&env)?,
                    })
                })
            }
            Self::Title(args) => {
                info!("executing protocol title");
                args.document
                    .mutate(cli, &config, |doc| Ok(doc.update_pr_title(&args.title)?))
            }
        }
    }
}

impl DocumentArgs {
    fn read(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.file)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", self.file.display(), e))
    }

    /// Apply `edit` to the document, then write it back or print it
    fn mutate<F>(&self, cli: &Cli, config: &Config, edit: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut ProtocolDocument<'_>) -> anyhow::Result<bool>,
    {
        let mut document = ProtocolDocument::new(self.read()?, &config.protocol);
        let changed = edit(&mut document)?;
        self.finish(cli, document, changed)
    }

    fn finish(
        &self,
        cli: &Cli,
        document: ProtocolDocument<'_>,
        changed: bool,
    ) -> anyhow::Result<()> {
        if self.in_place && changed {
            std::fs::write(&self.file, document.text())?;
        }

        match cli.format {
            OutputFormat::Json => {
                let output = json!({
                    "file": self.file.display().to_string(),
                    "changed": changed,
                    "written": self.in_place && changed,
                    "document": document.into_text(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if self.in_place => {
                if cli.quiet {
                    return Ok(());
                }
                if changed {
                    output::success(&format!(
                        "Updated {}",
                        output::path_style().apply_to(self.file.display())
                    ));
                } else {
                    output::warning("Document unchanged");
                }
            }
            OutputFormat::Text => print!("{}", document.text()),
        }
        Ok(())
    }
}

impl TasklistArgs {
    fn run(&self, cli: &Cli, config: &Config) -> anyhow::Result<()> {
        info!(complete = self.complete.len(), "executing protocol tasklist");
        let parser = ConventionalParser::new();

        if !self.complete.is_empty() {
            return self.document.mutate(cli, config, |doc| {
                let mut entries = doc.get_tasklist(&parser)?;
                let marked: usize = self
                    .complete
                    .iter()
                    .map(|summary| tasklist::mark_complete(&mut entries, summary))
                    .sum();
                if marked == 0 {
                    return Ok(false);
                }
                Ok(doc.update_tasklist(&entries)?)
            });
        }

        let document = ProtocolDocument::new(self.document.read()?, &config.protocol);
        let entries = document.get_tasklist(&parser)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                print!("{}", tasklist::serialize(&entries));
                if !cli.quiet {
                    let (done, total) = count(&entries);
                    println!();
                    println!("{}", style(format!("{}/{} tasks complete", done, total)).dim());
                }
            }
        }
        Ok(())
    }
}

/// Completed and total tasks, counting subtasks
fn count(entries: &[TaskEntry]) -> (usize, usize) {
    entries.iter().fold((0, 0), |(done, total), entry| {
        let (sub_done, sub_total) = count(&entry.subtasks);
        (
            done + usize::from(entry.complete) + sub_done,
            total + 1 + sub_total,
        )
    })
}
