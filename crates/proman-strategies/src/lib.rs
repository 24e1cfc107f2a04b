//! ProMan Strategies - Version computation for release management
//!
//! This crate provides the PEP 440 [`SemanticVersion`] value type and the
//! [`VersionResolver`] that turns a release action into the next version.

mod resolver;
pub mod types;
mod version;

pub use resolver::VersionResolver;
pub use types::{LocalSegment, PrePhase};
pub use version::SemanticVersion;
