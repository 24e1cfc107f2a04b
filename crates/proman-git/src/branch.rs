//! Branch name classification

use proman_core::config::BranchesConfig;
use proman_core::error::BranchError;
use proman_strategies::SemanticVersion;
use serde::Serialize;
use tracing::debug;

/// Kind of branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Main,
    Release,
    Pre,
    Dev,
    Auto,
    Other,
}

impl BranchKind {
    /// Returns the string representation of the branch kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Release => "release",
            Self::Pre => "pre",
            Self::Dev => "dev",
            Self::Auto => "auto",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for BranchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded part of a branch name after its prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum BranchSuffix {
    /// The default branch has no suffix
    None,
    /// Major version of a release branch
    Major(u64),
    /// Target version of a pre-release branch
    Version(SemanticVersion),
    /// Issue number and target branch of a development branch
    Dev { issue: u64, target: String },
    /// Undecoded remainder
    Raw(String),
}

/// A classified branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Branch kind
    pub kind: BranchKind,
    /// Full branch name
    pub name: String,
    /// Matched prefix
    pub prefix: Option<String>,
    /// Decoded suffix
    pub suffix: BranchSuffix,
}

impl Branch {
    /// Classify a branch name.
    ///
    /// The default branch matches by exact name. Otherwise prefixes are tried
    /// in the order release, pre, dev, auto; a name matching none of them is
    /// [`BranchKind::Other`] with the full name as raw suffix.
    pub fn resolve(name: &str, config: &BranchesConfig) -> Result<Self, BranchError> {
        if name == config.default {
            return Ok(Self {
                kind: BranchKind::Main,
                name: name.to_string(),
                prefix: None,
                suffix: BranchSuffix::None,
            });
        }

        let prefixes = [
            (BranchKind::Release, &config.release),
            (BranchKind::Pre, &config.pre),
            (BranchKind::Dev, &config.dev),
            (BranchKind::Auto, &config.auto),
        ];

        for (kind, prefix) in prefixes {
            let Some(raw) = name.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let suffix = decode_suffix(kind, name, raw)?;
            debug!(branch = name, kind = %kind, "classified branch");
            return Ok(Self {
                kind,
                name: name.to_string(),
                prefix: Some(prefix.clone()),
                suffix,
            });
        }

        debug!(branch = name, "branch matches no configured prefix");
        Ok(Self {
            kind: BranchKind::Other,
            name: name.to_string(),
            prefix: None,
            suffix: BranchSuffix::Raw(name.to_string()),
        })
    }

    /// Major version of a release branch
    pub fn release_major(&self) -> Option<u64> {
        match self.suffix {
            BranchSuffix::Major(major) => Some(major),
            _ => None,
        }
    }

    /// Target version of a pre-release branch
    pub fn pre_version(&self) -> Option<&SemanticVersion> {
        match &self.suffix {
            BranchSuffix::Version(version) => Some(version),
            _ => None,
        }
    }

    /// Issue number and target branch of a development branch
    pub fn dev_target(&self) -> Option<(u64, &str)> {
        match &self.suffix {
            BranchSuffix::Dev { issue, target } => Some((*issue, target.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

fn decode_suffix(kind: BranchKind, name: &str, raw: &str) -> Result<BranchSuffix, BranchError> {
    match kind {
        BranchKind::Release => raw
            .parse::<u64>()
            .map(BranchSuffix::Major)
            .map_err(|_| BranchError::InvalidReleaseSuffix(name.to_string())),
        BranchKind::Pre => SemanticVersion::parse(raw)
            .map(BranchSuffix::Version)
            .map_err(|e| BranchError::InvalidPreSuffix {
                branch: name.to_string(),
                reason: e.to_string(),
            }),
        BranchKind::Dev => {
            let invalid = |reason: &str| BranchError::InvalidDevSuffix {
                branch: name.to_string(),
                reason: reason.to_string(),
            };
            let (issue, target) = raw
                .split_once('/')
                .ok_or_else(|| invalid("missing '/' between issue number and target"))?;
            let issue = issue
                .parse::<u64>()
                .map_err(|_| invalid("issue number is not an integer"))?;
            if target.is_empty() {
                return Err(invalid("target branch is empty"));
            }
            Ok(BranchSuffix::Dev {
                issue,
                target: target.to_string(),
            })
        }
        BranchKind::Auto | BranchKind::Main | BranchKind::Other => {
            Ok(BranchSuffix::Raw(raw.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(name: &str) -> Result<Branch, BranchError> {
        Branch::resolve(name, &BranchesConfig::default())
    }

    #[test]
    fn test_default_branch() {
        let branch = resolve("main").unwrap();
        assert_eq!(branch.kind, BranchKind::Main);
        assert_eq!(branch.prefix, None);
        assert_eq!(branch.suffix, BranchSuffix::None);
    }

    #[test]
    fn test_release_branch() {
        let branch = resolve("release/3").unwrap();
        assert_eq!(branch.kind, BranchKind::Release);
        assert_eq!(branch.prefix.as_deref(), Some("release/"));
        assert_eq!(branch.release_major(), Some(3));

        assert!(matches!(
            resolve("release/three"),
            Err(BranchError::InvalidReleaseSuffix(_))
        ));
    }

    #[test]
    fn test_pre_branch() {
        let branch = resolve("pre/1.0.0.a1").unwrap();
        assert_eq!(branch.kind, BranchKind::Pre);
        assert_eq!(
            branch.pre_version(),
            Some(&SemanticVersion::parse("1.0.0a1").unwrap())
        );

        assert!(matches!(
            resolve("pre/next"),
            Err(BranchError::InvalidPreSuffix { .. })
        ));
    }

    #[test]
    fn test_dev_branch() {
        let branch = resolve("dev/42/release/2").unwrap();
        assert_eq!(branch.kind, BranchKind::Dev);
        assert_eq!(branch.dev_target(), Some((42, "release/2")));

        assert!(matches!(resolve("dev/42"), Err(BranchError::InvalidDevSuffix { .. })));
        assert!(matches!(resolve("dev/x/main"), Err(BranchError::InvalidDevSuffix { .. })));
        assert!(matches!(resolve("dev/7/"), Err(BranchError::InvalidDevSuffix { .. })));
    }

    #[test]
    fn test_auto_and_other() {
        let branch = resolve("auto/sync-templates").unwrap();
        assert_eq!(branch.kind, BranchKind::Auto);
        assert_eq!(branch.suffix, BranchSuffix::Raw("sync-templates".to_string()));

        let branch = resolve("feature/login").unwrap();
        assert_eq!(branch.kind, BranchKind::Other);
        assert_eq!(branch.prefix, None);
        assert_eq!(branch.suffix, BranchSuffix::Raw("feature/login".to_string()));
    }

    #[test]
    fn test_prefix_order() {
        let config = BranchesConfig {
            release: "r".to_string(),
            pre: "re".to_string(),
            ..BranchesConfig::default()
        };
        let branch = Branch::resolve("re5", &config).unwrap_err();
        assert!(matches!(branch, BranchError::InvalidReleaseSuffix(_)));
    }
}
