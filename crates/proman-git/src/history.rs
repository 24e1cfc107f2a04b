//! Tag history abstraction

use crate::repository::Result;

/// Source of version tags and commit distances
///
/// Implemented by [`crate::GitRepo`]; tests substitute an in-memory history.
pub trait TagHistory {
    /// Tags reachable from `reference`, grouped by commit, newest commit first
    fn tag_groups(&self, reference: &str) -> Result<Vec<Vec<String>>>;

    /// Number of commits reachable from `reference` but not from `tag`
    fn distance(&self, tag: &str, reference: &str) -> Result<u64>;
}
