//! Init command

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;
use tracing::info;

use proman_core::config::defaults::{default_config_yaml, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML};
use proman_core::config::{validate_config, Config};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Configuration file syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigSyntax {
    #[default]
    Yaml,
    Toml,
}

/// Write a default ProMan configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Configuration syntax
    #[arg(long, default_value = "yaml")]
    pub syntax: ConfigSyntax,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, syntax = ?self.syntax, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self.output.clone().unwrap_or_else(|| {
            cwd.join(match self.syntax {
                ConfigSyntax::Yaml => DEFAULT_CONFIG_YAML,
                ConfigSyntax::Toml => DEFAULT_CONFIG_TOML,
            })
        });

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        let content = render(self.syntax)?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, &content)?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "file": config_path.display().to_string(),
                    "syntax": format!("{:?}", self.syntax).to_lowercase(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if !cli.quiet => {
                output::success(&format!(
                    "Created configuration at {}",
                    output::path_style().apply_to(config_path.display())
                ));
                println!();
                println!("Next steps:");
                println!("  1. Edit {} to match your branch and tag layout", config_path.display());
                println!("  2. Run {} to verify your setup", style("proman validate").cyan());
            }
            OutputFormat::Text => {}
        }
        Ok(())
    }
}

fn render(syntax: ConfigSyntax) -> anyhow::Result<String> {
    let config = Config::default();
    validate_config(&config)?;
    Ok(match syntax {
        ConfigSyntax::Yaml => default_config_yaml(),
        ConfigSyntax::Toml => toml::to_string_pretty(&config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_yaml_loads() {
        let yaml = render(ConfigSyntax::Yaml).unwrap();
        let config: Config = load_written(&yaml);
        assert_eq!(config.branches.default, Config::default().branches.default);
    }

    fn load_written(yaml: &str) -> Config {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_YAML);
        std::fs::write(&path, yaml).unwrap();
        proman_core::config::load_config(&path).unwrap()
    }
}
