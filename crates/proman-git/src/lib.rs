//! ProMan Git - Branches, tags and remotes for release automation
//!
//! This crate classifies branch names, reads tag history, finds the latest
//! released version and creates release tags.

pub mod branch;
mod commits;
mod history;
mod lookup;
mod remote;
mod repository;
mod tags;
pub mod types;

pub use branch::{Branch, BranchKind, BranchSuffix};
pub use history::TagHistory;
pub use lookup::{latest_in_groups, latest_version, VersionLookup};
pub use remote::{git_push_tag, wait_for_commit_with};
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, TagInfo};
