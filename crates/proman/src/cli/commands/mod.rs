//! CLI commands

mod branch;
mod changelog;
mod init;
mod protocol;
mod validate;
mod version;

pub use branch::BranchCommand;
pub use changelog::ChangelogCommand;
pub use init::InitCommand;
pub use protocol::ProtocolCommand;
pub use validate::ValidateCommand;
pub use version::VersionCommand;

use std::path::PathBuf;

use proman_core::config::{load_config_or_default, Config};

/// Current directory and the configuration that applies to it
fn load_workspace() -> anyhow::Result<(PathBuf, Config)> {
    let cwd = std::env::current_dir()?;
    let (config, _) = load_config_or_default(&cwd)?;
    Ok((cwd, config))
}
