//! PEP 440 semantic version value type

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

use proman_core::error::VersionError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{LocalSegment, PrePhase};

/// Accepted version spellings; release tuples have one to three components
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?P<release>[0-9]+(?:\.[0-9]+){0,2})
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:-(?P<post_n1>[0-9]+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("Invalid regex")
});

/// A version with PEP 440 precedence
///
/// Ordering within one release tuple is
/// `dev < pre-release < release < post-release`, with phases `a < b < rc`.
/// Local labels sort above the same version without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Option<(PrePhase, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Bound<T> {
    Below,
    At(T),
    Above,
}

impl SemanticVersion {
    /// Create a final release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let fail = |reason: &str| VersionError::ParseFailed(input.to_string(), reason.to_string());

        let caps = VERSION_REGEX
            .captures(input)
            .ok_or_else(|| fail("not a PEP 440 version"))?;

        let number = |raw: &str| raw.parse::<u64>().map_err(|e| fail(&e.to_string()));
        let optional = |name: &str| -> Result<u64, VersionError> {
            caps.name(name).map_or(Ok(0), |m| number(m.as_str()))
        };

        let mut release = [0u64; 3];
        for (slot, part) in release.iter_mut().zip(caps["release"].split('.')) {
            *slot = number(part)?;
        }

        let pre = match caps.name("pre_l") {
            Some(label) => {
                let phase = PrePhase::from_label(label.as_str())
                    .ok_or_else(|| fail("unknown pre-release phase"))?;
                Some((phase, optional("pre_n")?))
            }
            None => None,
        };

        let post = if let Some(n) = caps.name("post_n1") {
            Some(number(n.as_str())?)
        } else if caps.name("post_l").is_some() {
            Some(optional("post_n2")?)
        } else {
            None
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(optional("dev_n")?),
            None => None,
        };

        let local = caps.name("local").map(|m| {
            m.as_str()
                .split(['-', '_', '.'])
                .map(LocalSegment::parse)
                .collect()
        });

        Ok(Self {
            major: release[0],
            minor: release[1],
            patch: release[2],
            pre,
            post,
            dev,
            local,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Pre-release phase and number
    pub fn pre(&self) -> Option<(PrePhase, u64)> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// Local label segments
    pub fn local(&self) -> Option<&[LocalSegment]> {
        self.local.as_deref()
    }

    /// Whether an `a`, `b` or `rc` segment is present
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// Whether a `dev` segment is present
    pub fn is_devrelease(&self) -> bool {
        self.dev.is_some()
    }

    /// Whether a `post` segment is present
    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// `(major + 1).0.0`
    pub fn next_major(&self) -> Self {
        Self::new(self.major + 1, 0, 0)
    }

    /// `major.(minor + 1).0`
    pub fn next_minor(&self) -> Self {
        Self::new(self.major, self.minor + 1, 0)
    }

    /// `major.minor.(patch + 1)`
    pub fn next_patch(&self) -> Self {
        Self::new(self.major, self.minor, self.patch + 1)
    }

    /// Next post release of the same release and pre-release segment.
    ///
    /// The counter starts at 0 when no post segment exists yet.
    pub fn next_post(&self) -> Self {
        Self {
            post: Some(self.post.map_or(0, |n| n + 1)),
            dev: None,
            local: None,
            ..self.clone()
        }
    }

    /// First version of the following pre-release phase (`a -> b -> rc`);
    /// `None` for final releases and release candidates
    pub fn next_pre_phase(&self) -> Option<Self> {
        let (phase, _) = self.pre?;
        let next = phase.next()?;
        Some(Self::new(self.major, self.minor, self.patch).with_pre(next, 1))
    }

    /// Set the pre-release segment
    pub fn with_pre(mut self, phase: PrePhase, number: u64) -> Self {
        self.pre = Some((phase, number));
        self
    }

    /// Set the dev segment
    pub fn with_dev(mut self, number: u64) -> Self {
        self.dev = Some(number);
        self
    }

    /// Drop the dev segment
    pub fn without_dev(&self) -> Self {
        Self {
            dev: None,
            ..self.clone()
        }
    }

    #[allow(clippy::type_complexity)]
    fn sort_key(
        &self,
    ) -> (
        (u64, u64, u64),
        Bound<(PrePhase, u64)>,
        Bound<u64>,
        Bound<u64>,
        Bound<&[LocalSegment]>,
    ) {
        let pre = match (self.pre, self.post, self.dev) {
            (Some(pre), _, _) => Bound::At(pre),
            (None, None, Some(_)) => Bound::Below,
            (None, _, _) => Bound::Above,
        };
        let post = self.post.map_or(Bound::Below, Bound::At);
        let dev = self.dev.map_or(Bound::Above, Bound::At);
        let local = self.local().map_or(Bound::Below, Bound::At);

        ((self.major, self.minor, self.patch), pre, post, dev, local)
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some((phase, n)) = self.pre {
            write!(f, ".{}{}", phase, n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if let Some(local) = &self.local {
            let label: Vec<String> = local.iter().map(|s| s.to_string()).collect();
            write!(f, "+{}", label.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let version = v("1.2.3");
        assert_eq!((version.major(), version.minor(), version.patch()), (1, 2, 3));
        assert!(!version.is_prerelease());
        assert!(!version.is_devrelease());
    }

    #[test]
    fn test_parse_pads_release() {
        assert_eq!(v("2"), SemanticVersion::new(2, 0, 0));
        assert_eq!(v("v1.4"), SemanticVersion::new(1, 4, 0));
    }

    #[test]
    fn test_parse_segments() {
        let version = v("1.2.3.a7.dev2");
        assert_eq!(version.pre(), Some((PrePhase::Alpha, 7)));
        assert_eq!(version.dev(), Some(2));
        assert_eq!(version.post(), None);

        let version = v("1.0.0rc1.post2+Ubuntu-1");
        assert_eq!(version.pre(), Some((PrePhase::Rc, 1)));
        assert_eq!(version.post(), Some(2));
        assert_eq!(
            version.local(),
            Some(&[LocalSegment::Alpha("ubuntu".to_string()), LocalSegment::Num(1)][..])
        );
    }

    #[test]
    fn test_parse_alternate_spellings() {
        assert_eq!(v("1.0.0-alpha.1"), v("1.0.0.a1"));
        assert_eq!(v("1.0.0preview2"), v("1.0.0.rc2"));
        assert_eq!(v("1.0.0b"), v("1.0.0.b0"));
        assert_eq!(v("1.0.0-3"), v("1.0.0.post3"));
        assert_eq!(v("1.0.0.rev1"), v("1.0.0.post1"));
        assert_eq!(v("1.0.0dev"), v("1.0.0.dev0"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SemanticVersion::parse("").is_err());
        assert!(SemanticVersion::parse("main").is_err());
        assert!(SemanticVersion::parse("1.2.3.4").is_err());
        assert!(SemanticVersion::parse("1.2.3.gamma1").is_err());
    }

    #[test]
    fn test_display_is_dotted() {
        assert_eq!(v("1.2.3a7dev2").to_string(), "1.2.3.a7.dev2");
        assert_eq!(v("1.2.3-1").to_string(), "1.2.3.post1");
        assert_eq!(v("1.2.3+abc-1").to_string(), "1.2.3+abc.1");
    }

    #[test]
    fn test_ordering_within_release() {
        let ordered = [
            "1.0.0.dev0",
            "1.0.0.a1.dev0",
            "1.0.0.a1",
            "1.0.0.a1.post0",
            "1.0.0.b1",
            "1.0.0.rc1",
            "1.0.0",
            "1.0.0+local",
            "1.0.0.post0.dev0",
            "1.0.0.post0",
            "1.0.0.post1",
            "1.0.1.dev0",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_ordering_across_releases() {
        assert!(v("0.9.9") < v("0.10.0"));
        assert!(v("1.9.0.post3") < v("1.10.0.dev0"));
        assert!(v("2.0.0.a1") > v("1.99.99"));
        assert_eq!(v("1.0").cmp(&v("1.0.0")), Ordering::Equal);
    }

    #[test]
    fn test_next_versions_drop_segments() {
        let base = v("1.2.3.b2.post1.dev4");
        assert_eq!(base.next_major(), v("2.0.0"));
        assert_eq!(base.next_minor(), v("1.3.0"));
        assert_eq!(base.next_patch(), v("1.2.4"));
    }

    #[test]
    fn test_next_post() {
        assert_eq!(v("1.2.3").next_post(), v("1.2.3.post0"));
        assert_eq!(v("1.2.3.post0").next_post(), v("1.2.3.post1"));
        assert_eq!(v("1.2.3.a4.dev1").next_post(), v("1.2.3.a4.post0"));
        assert!(v("1.2.3.dev5").next_post() > v("1.2.3.dev5"));
        assert!(v("1.2.3").next_post().is_postrelease());
        assert!(!v("1.2.3").is_postrelease());
    }

    #[test]
    fn test_next_pre_phase() {
        assert_eq!(v("1.0.0.a3").next_pre_phase(), Some(v("1.0.0.b1")));
        assert_eq!(v("1.0.0.b3.post1").next_pre_phase(), Some(v("1.0.0.rc1")));
        assert_eq!(v("1.0.0.rc1").next_pre_phase(), None);
        assert_eq!(v("1.0.0").next_pre_phase(), None);
    }

    #[test]
    fn test_dev_helpers() {
        let version = v("2.1.0").with_pre(PrePhase::Alpha, 12).with_dev(3);
        assert_eq!(version.to_string(), "2.1.0.a12.dev3");
        assert_eq!(version.without_dev(), v("2.1.0.a12"));
    }

    #[test]
    fn test_serde_as_string() {
        let version = v("1.2.3.post1");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"1.2.3.post1\"");
        let back: SemanticVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
        assert!(serde_json::from_str::<SemanticVersion>("\"nope\"").is_err());
    }
}
