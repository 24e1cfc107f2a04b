//! Error types for ProMan

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ProManError
pub type Result<T> = std::result::Result<T, ProManError>;

/// Main error type for ProMan operations
#[derive(Debug, Error)]
pub enum ProManError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Branch classification errors
    #[error(transparent)]
    Branch(#[from] BranchError),

    /// Protocol document errors
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Template errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of failures, used to decide how a run reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed user input (branch names, versions, markdown)
    Parse,
    /// Repository state disagrees with what the run expected
    StateConflict,
    /// Missing or invalid configuration, or an action not allowed in the current state
    Configuration,
    /// Filesystem failures
    Io,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Returns the string representation of the error kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::StateConflict => "state-conflict",
            Self::Configuration => "configuration",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Reference could not be resolved
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    /// Tag already exists
    #[error("Tag already exists: {0}")]
    TagExists(String),

    /// Failed to push
    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    /// A pushed commit never showed up on the remote
    #[error("Commit {sha} not observed on {remote} after {attempts} attempts")]
    CommitNotObserved {
        sha: String,
        remote: String,
        attempts: u32,
    },

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// Git command failed
    #[error("git {command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// Release action not applicable to the version
    #[error("Cannot apply {action} release to version {version}: {reason}")]
    InvalidAction {
        action: String,
        version: String,
        reason: String,
    },
}

/// Branch classification errors
#[derive(Debug, Error)]
pub enum BranchError {
    /// Release branch suffix is not a major version number
    #[error("Release branch '{0}' must end in a major version number")]
    InvalidReleaseSuffix(String),

    /// Pre-release branch suffix is not a version
    #[error("Pre-release branch '{branch}' has invalid version suffix: {reason}")]
    InvalidPreSuffix { branch: String, reason: String },

    /// Development branch suffix is not `<issue>/<target>`
    #[error("Development branch '{branch}' must look like '<prefix><issue>/<target>': {reason}")]
    InvalidDevSuffix { branch: String, reason: String },
}

/// Protocol document errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Field id has no marker configuration
    #[error("No marker configured for protocol field '{0}'")]
    UnknownField(String),

    /// Data to insert contains the field's own markers
    #[error("Data for protocol field '{0}' contains its own markers")]
    MarkerInData(String),

    /// Tasklist markdown could not be parsed
    #[error("Malformed tasklist at line {line}: {reason}")]
    MalformedTasklist { line: usize, reason: String },
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Changelog file is not a JSON array of records
    #[error("Changelog file {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// No ongoing record to operate on
    #[error("No ongoing changelog record")]
    NoOngoingRecord,

    /// Failed to write changelog
    #[error("Failed to write changelog: {0}")]
    WriteFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Template errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Placeholder opened but never closed
    #[error("Unterminated placeholder at offset {offset} in template '{template}'")]
    Unterminated { template: String, offset: usize },

    /// Empty placeholder name
    #[error("Empty placeholder at offset {offset} in template '{template}'")]
    EmptyPlaceholder { template: String, offset: usize },
}

impl ProManError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Template(_) => ErrorKind::Configuration,
            Self::Git(err) => match err {
                GitError::TagExists(_)
                | GitError::PushFailed(_)
                | GitError::CommitNotObserved { .. } => ErrorKind::StateConflict,
                _ => ErrorKind::Other,
            },
            Self::Version(err) => match err {
                VersionError::ParseFailed(..) => ErrorKind::Parse,
                VersionError::InvalidAction { .. } => ErrorKind::Configuration,
            },
            Self::Branch(_) => ErrorKind::Parse,
            Self::Protocol(err) => match err {
                ProtocolError::MalformedTasklist { .. } => ErrorKind::Parse,
                ProtocolError::UnknownField(_) | ProtocolError::MarkerInData(_) => {
                    ErrorKind::Configuration
                }
            },
            Self::Changelog(err) => match err {
                ChangelogError::Malformed { .. } => ErrorKind::Parse,
                ChangelogError::Io(_) | ChangelogError::WriteFailed(_) => ErrorKind::Io,
                ChangelogError::NoOngoingRecord => ErrorKind::StateConflict,
            },
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Parse,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err: ProManError = GitError::TagExists("v1.0.0".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        let err: ProManError =
            VersionError::ParseFailed("x".to_string(), "bad".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err: ProManError = ConfigError::MissingField("branches.default".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: ProManError = BranchError::InvalidReleaseSuffix("release/x".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_invalid_action_is_configuration() {
        let err: ProManError = VersionError::InvalidAction {
            action: "minor".to_string(),
            version: "1.0.0.rc1".to_string(),
            reason: "release candidates only accept post releases".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("1.0.0.rc1"));
    }

    #[test]
    fn test_error_display() {
        let err = ProManError::other("something broke");
        assert_eq!(err.to_string(), "something broke");
        assert_eq!(err.kind().to_string(), "other");
    }
}
