//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "proman.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "proman.toml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ".proman.yaml",
        ".proman.toml",
    ]
}

/// Render the default configuration as YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Minimal configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ProMan Configuration

branches:
  default: main
  release: release/
  pre: pre/
  dev: dev/
  auto: auto/

versioning:
  tag_prefix: v
  zero_major_softening: true

git:
  remote: origin
  poll_attempts: 10
  poll_interval_secs: 5

protocol:
  marker_pattern: "<!-- {pos}-{id} -->"
  pos_start: start
  pos_end: end

changelog:
  file: .github/.changelog.json
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate_config;

    #[test]
    fn test_default_yaml_round_trips() {
        let yaml = default_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.commits.len(), Config::default().commits.len());
    }

    #[test]
    fn test_template_parses() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.branches.dev, "dev/");
    }
}
