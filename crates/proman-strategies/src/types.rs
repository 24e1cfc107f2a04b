//! Version segment types

use serde::{Deserialize, Serialize};

/// Pre-release phase, ordered `a < b < rc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrePhase {
    /// Alpha (`a`)
    Alpha,
    /// Beta (`b`)
    Beta,
    /// Release candidate (`rc`)
    Rc,
}

impl PrePhase {
    /// Canonical short spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::Rc => "rc",
        }
    }

    /// The phase after this one; `None` for release candidates
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Alpha => Some(Self::Beta),
            Self::Beta => Some(Self::Rc),
            Self::Rc => None,
        }
    }

    /// Parse any accepted spelling (`alpha`, `a`, `beta`, `b`, `c`, `pre`, `preview`, `rc`)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "c" | "pre" | "preview" | "rc" => Some(Self::Rc),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dot-separated segment of a local version label (`+ubuntu.1`)
///
/// Alphanumeric segments sort before numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocalSegment {
    /// Lowercased alphanumeric segment
    Alpha(String),
    /// Numeric segment
    Num(u64),
}

impl LocalSegment {
    /// Classify a raw segment
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<u64>() {
            Ok(n) => Self::Num(n),
            Err(_) => Self::Alpha(raw.to_ascii_lowercase()),
        }
    }
}

impl std::fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha(s) => f.write_str(s),
            Self::Num(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert!(PrePhase::Alpha < PrePhase::Beta);
        assert!(PrePhase::Beta < PrePhase::Rc);
        assert_eq!(PrePhase::Beta.next(), Some(PrePhase::Rc));
        assert_eq!(PrePhase::Rc.next(), None);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(PrePhase::from_label("ALPHA"), Some(PrePhase::Alpha));
        assert_eq!(PrePhase::from_label("preview"), Some(PrePhase::Rc));
        assert_eq!(PrePhase::from_label("c"), Some(PrePhase::Rc));
        assert_eq!(PrePhase::from_label("gamma"), None);
    }

    #[test]
    fn test_local_segment_order() {
        assert!(LocalSegment::parse("abc") < LocalSegment::parse("1"));
        assert!(LocalSegment::parse("2") < LocalSegment::parse("10"));
        assert_eq!(LocalSegment::parse("Ubuntu"), LocalSegment::Alpha("ubuntu".to_string()));
    }
}
