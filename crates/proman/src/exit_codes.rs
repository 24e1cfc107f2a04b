//! Exit codes for the CLI

use proman_core::{ErrorKind, ProManError};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// State conflict (tag exists, push rejected, commit never observed)
pub const STATE_CONFLICT: i32 = 3;

/// Parse error in user-provided input
pub const PARSE_ERROR: i32 = 4;

/// Exit code for an error kind
pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Parse => PARSE_ERROR,
        ErrorKind::StateConflict => STATE_CONFLICT,
        ErrorKind::Configuration => CONFIG_ERROR,
        ErrorKind::Io | ErrorKind::Other => ERROR,
    }
}

/// Exit code for a command failure, from the first [`ProManError`] in its chain
pub fn for_error(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ProManError>())
        .map_or(ERROR, |e| for_kind(e.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proman_core::error::{GitError, VersionError};

    #[test]
    fn test_codes_by_kind() {
        assert_eq!(for_kind(ErrorKind::Parse), 4);
        assert_eq!(for_kind(ErrorKind::StateConflict), 3);
        assert_eq!(for_kind(ErrorKind::Configuration), 2);
        assert_eq!(for_kind(ErrorKind::Io), 1);
        assert_eq!(for_kind(ErrorKind::Other), ERROR);
    }

    #[test]
    fn test_code_from_error_chain() {
        let err: anyhow::Error =
            ProManError::from(VersionError::ParseFailed("x".to_string(), "bad".to_string())).into();
        assert_eq!(for_error(&err), PARSE_ERROR);

        let err = anyhow::Error::from(ProManError::from(GitError::TagExists("v1".to_string())))
            .context("tagging release");
        assert_eq!(for_error(&err), STATE_CONFLICT);

        assert_eq!(for_error(&anyhow::anyhow!("plain failure")), ERROR);
    }
}
