//! ProMan Changelog - Changelog assembly and storage
//!
//! Completed conventional tasks from a development protocol are classified
//! into channels and sections, then recorded in a JSON changelog store whose
//! head record tracks the unreleased build.

pub mod assembler;
pub mod classify;
pub mod parser;
pub mod store;

pub use assembler::{ChangeEntry, ChangelogAssembler, Changes};
pub use classify::CommitClassifier;
pub use parser::ConventionalParser;
pub use store::{ChangelogStore, Contributor, Parent, ProtocolSnapshot, Record, Releases};
