//! Core types for ProMan

use serde::{Deserialize, Serialize};

/// Release action declared by a change
///
/// Internal changes that ship nothing are expressed as `Option::<ReleaseAction>::None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseAction {
    /// Post release (packaging or metadata fix)
    Post,
    /// Patch version bump (bug fixes)
    Patch,
    /// Minor version bump (new features)
    Minor,
    /// Major version bump (breaking changes)
    Major,
}

impl ReleaseAction {
    /// Returns the string representation of the release action
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReleaseAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "post" => Ok(Self::Post),
            _ => Err(format!("Unknown release action: {}", s)),
        }
    }
}

/// Lifecycle status of an issue or pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    Triage,
    Rejected,
    Duplicate,
    Invalid,
    Planning,
    RequirementAnalysis,
    Design,
    Implementation,
    Testing,
    DeployAlpha,
    DeployBeta,
    DeployRc,
    DeployFinal,
}

impl IssueStatus {
    /// All statuses in lifecycle order
    pub const ALL: [IssueStatus; 13] = [
        Self::Triage,
        Self::Rejected,
        Self::Duplicate,
        Self::Invalid,
        Self::Planning,
        Self::RequirementAnalysis,
        Self::Design,
        Self::Implementation,
        Self::Testing,
        Self::DeployAlpha,
        Self::DeployBeta,
        Self::DeployRc,
        Self::DeployFinal,
    ];

    /// Progress level; closed-without-work statuses share level 1
    pub fn level(&self) -> u8 {
        match self {
            Self::Triage => 0,
            Self::Rejected | Self::Duplicate | Self::Invalid => 1,
            Self::Planning => 2,
            Self::RequirementAnalysis => 3,
            Self::Design => 4,
            Self::Implementation => 5,
            Self::Testing => 6,
            Self::DeployAlpha => 7,
            Self::DeployBeta => 8,
            Self::DeployRc => 9,
            Self::DeployFinal => 10,
        }
    }

    /// Returns the string representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Rejected => "rejected",
            Self::Duplicate => "duplicate",
            Self::Invalid => "invalid",
            Self::Planning => "planning",
            Self::RequirementAnalysis => "requirement-analysis",
            Self::Design => "design",
            Self::Implementation => "implementation",
            Self::Testing => "testing",
            Self::DeployAlpha => "deploy-alpha",
            Self::DeployBeta => "deploy-beta",
            Self::DeployRc => "deploy-rc",
            Self::DeployFinal => "deploy-final",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Unknown issue status: {}", s))
    }
}
