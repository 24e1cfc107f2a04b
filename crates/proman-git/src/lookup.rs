//! Latest-version lookup over tag history

use proman_strategies::SemanticVersion;
use tracing::{debug, error, instrument};

use crate::history::TagHistory;
use crate::repository::Result;

/// Latest version in newest-first tag groups, with the tag it came from.
///
/// Only the first group holding any `prefix` version tag is considered.
/// With `dev_only` the highest dev release of that group is returned, or
/// `None` if the group has none; older groups are not scanned.
pub fn latest_in_groups(
    groups: &[Vec<String>],
    prefix: &str,
    dev_only: bool,
) -> Option<(SemanticVersion, String)> {
    for group in groups {
        let mut versions: Vec<(SemanticVersion, &String)> = group
            .iter()
            .filter_map(|tag| {
                let raw = tag.strip_prefix(prefix)?;
                SemanticVersion::parse(raw).ok().map(|v| (v, tag))
            })
            .collect();

        if versions.is_empty() {
            continue;
        }

        versions.sort_by(|a, b| b.0.cmp(&a.0));
        let found = if dev_only {
            versions.into_iter().find(|(v, _)| v.is_devrelease())
        } else {
            versions.into_iter().next()
        };
        return found.map(|(v, tag)| (v, tag.clone()));
    }
    None
}

/// Latest version reachable from `reference` and its distance in commits.
///
/// Dev lookups never compute a distance. A missing release tag is logged as
/// an error and reported as `(None, None)` so callers can treat it as "no
/// prior release".
#[instrument(skip(history))]
pub fn latest_version<H: TagHistory + ?Sized>(
    history: &H,
    prefix: &str,
    dev_only: bool,
    reference: &str,
) -> Result<(Option<SemanticVersion>, Option<u64>)> {
    let groups = history.tag_groups(reference)?;

    match latest_in_groups(&groups, prefix, dev_only) {
        Some((version, _)) if dev_only => {
            debug!(version = %version, "found latest dev version");
            Ok((Some(version), None))
        }
        Some((version, tag)) => {
            let distance = history.distance(&tag, reference)?;
            debug!(version = %version, tag = %tag, distance, "found latest version");
            Ok((Some(version), Some(distance)))
        }
        None if dev_only => {
            debug!(reference, "no dev version found");
            Ok((None, None))
        }
        None => {
            error!(prefix, reference, "no version tag found");
            Ok((None, None))
        }
    }
}

/// Version lookups bound to one history and tag prefix
pub struct VersionLookup<'a, H: TagHistory + ?Sized> {
    history: &'a H,
    prefix: String,
}

impl<'a, H: TagHistory + ?Sized> VersionLookup<'a, H> {
    /// Create a lookup
    pub fn new(history: &'a H, prefix: impl Into<String>) -> Self {
        Self {
            history,
            prefix: prefix.into(),
        }
    }

    /// Latest release version and distance from `reference`
    pub fn latest(&self, reference: &str) -> Result<(Option<SemanticVersion>, Option<u64>)> {
        latest_version(self.history, &self.prefix, false, reference)
    }

    /// Latest dev version on `reference`
    pub fn latest_dev(&self, reference: &str) -> Result<Option<SemanticVersion>> {
        latest_version(self.history, &self.prefix, true, reference).map(|(version, _)| version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proman_core::error::GitError;
    use std::collections::HashMap;

    struct MemoryHistory {
        groups: Vec<Vec<String>>,
        distances: HashMap<String, u64>,
    }

    impl MemoryHistory {
        fn new(groups: &[&[&str]]) -> Self {
            Self {
                groups: groups
                    .iter()
                    .map(|g| g.iter().map(|t| t.to_string()).collect())
                    .collect(),
                distances: HashMap::new(),
            }
        }

        fn with_distance(mut self, tag: &str, distance: u64) -> Self {
            self.distances.insert(tag.to_string(), distance);
            self
        }
    }

    impl TagHistory for MemoryHistory {
        fn tag_groups(&self, _reference: &str) -> Result<Vec<Vec<String>>> {
            Ok(self.groups.clone())
        }

        fn distance(&self, tag: &str, _reference: &str) -> Result<u64> {
            self.distances
                .get(tag)
                .copied()
                .ok_or_else(|| GitError::ReferenceNotFound(tag.to_string()))
        }
    }

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn test_latest_in_first_matching_group() {
        let history =
            MemoryHistory::new(&[&["v2.0.0", "other"], &["v1.0.0"]]).with_distance("v2.0.0", 4);
        let (version, distance) = latest_version(&history, "v", false, "HEAD").unwrap();
        assert_eq!(version, Some(v("2.0.0")));
        assert_eq!(distance, Some(4));
    }

    #[test]
    fn test_skips_groups_without_version_tags() {
        let history =
            MemoryHistory::new(&[&["nightly"], &["v1.1.0", "v1.1.0.post0"], &["v1.0.0"]])
                .with_distance("v1.1.0.post0", 2);
        let lookup = VersionLookup::new(&history, "v");
        assert_eq!(lookup.latest("HEAD").unwrap(), (Some(v("1.1.0.post0")), Some(2)));
    }

    #[test]
    fn test_dev_only_stops_at_first_group() {
        let history = MemoryHistory::new(&[
            &["v1.3.0.a7.dev1", "v1.3.0.a7.dev0", "v1.2.3"],
            &["v1.3.0.a7.dev5"],
        ]);
        let lookup = VersionLookup::new(&history, "v");
        assert_eq!(lookup.latest_dev("dev/7/main").unwrap(), Some(v("1.3.0.a7.dev1")));

        let history = MemoryHistory::new(&[&["v1.2.3"], &["v1.3.0.a7.dev5"]]);
        let lookup = VersionLookup::new(&history, "v");
        assert_eq!(lookup.latest_dev("dev/7/main").unwrap(), None);
    }

    #[test]
    fn test_dev_only_skips_distance() {
        let history = MemoryHistory::new(&[&["v0.1.0.dev3"]]);
        let result = latest_version(&history, "v", true, "HEAD").unwrap();
        assert_eq!(result, (Some(v("0.1.0.dev3")), None));
    }

    #[test]
    fn test_no_tags_is_not_an_error() {
        let history = MemoryHistory::new(&[&["nightly"], &["release-1.0.0"]]);
        assert_eq!(latest_version(&history, "v", false, "HEAD").unwrap(), (None, None));
        assert_eq!(latest_in_groups(&[], "v", false), None);
    }

    #[test]
    fn test_custom_prefix() {
        let groups = vec![vec!["ver3.0.0".to_string(), "v9.0.0".to_string()]];
        let (version, tag) = latest_in_groups(&groups, "ver", false).unwrap();
        assert_eq!(version, v("3.0.0"));
        assert_eq!(tag, "ver3.0.0");
    }
}
