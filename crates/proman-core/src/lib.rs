//! ProMan Core - Core library for repository automation
//!
//! This crate provides the foundational types, error handling, configuration
//! and templating shared by the ProMan version, protocol and changelog engines.

pub mod commit;
pub mod config;
pub mod error;
pub mod template;
pub mod types;

pub use commit::{ConventionalMessage, Footer, MessageParser};
pub use error::{ErrorKind, ProManError, Result};
pub use template::{Template, TemplateEnv};
pub use types::{IssueStatus, ReleaseAction};
