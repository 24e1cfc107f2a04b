//! Run reports: a named pass/fail line per step of a command

use std::fmt::Display;

use console::style;
use serde::Serialize;

use crate::cli::OutputFormat;

/// Outcome of one named step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered checks of a single command run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    title: String,
    passed: bool,
    checks: Vec<Check>,
}

impl RunReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            passed: true,
            checks: Vec::new(),
        }
    }

    pub fn pass(&mut self, name: &str, detail: Option<String>) {
        self.push(name, true, detail);
    }

    pub fn fail(&mut self, name: &str, detail: impl Into<String>) {
        self.push(name, false, Some(detail.into()));
    }

    /// Record `result` under `name` and hand it back unchanged
    pub fn check<T, E: Display>(&mut self, name: &str, result: Result<T, E>) -> Result<T, E> {
        match &result {
            Ok(_) => self.pass(name, None),
            Err(e) => self.fail(name, e.to_string()),
        }
        result
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Print the report when the run failed, then return `result`
    pub fn finish<T>(&self, format: OutputFormat, result: anyhow::Result<T>) -> anyhow::Result<T> {
        if result.is_err() {
            self.print(format)?;
        }
        result
    }

    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(self)?);
            }
            OutputFormat::Text => {
                println!("{}", style(&self.title).bold());
                for check in &self.checks {
                    let mark = if check.passed {
                        style("✓").green()
                    } else {
                        style("✗").red()
                    };
                    match &check.detail {
                        Some(detail) => {
                            println!("  {} {}: {}", mark, check.name, style(detail).dim())
                        }
                        None => println!("  {} {}", mark, check.name),
                    }
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, name: &str, passed: bool, detail: Option<String>) {
        self.passed &= passed;
        self.checks.push(Check {
            name: name.to_string(),
            passed,
            detail,
        });
    }
}
