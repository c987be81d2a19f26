//! Error types for the session layer.

use crate::Capability;

/// Boxed cause for remote failures that don't fit a narrower variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while establishing or using an operator session.
///
/// Only the fallible actions produce these: `login`, `fetch_identity`
/// and permission checks. Clearing a session (`logout`, `invalidate`)
/// never fails.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The auth service rejected the username/password pair.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The session is not (or no longer) valid: a 401 from the server,
    /// an empty profile body, or no token at all.
    #[error("session expired or invalid: {0}")]
    SessionExpiredOrInvalid(String),

    /// The auth service could not be reached; no status was received.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The current identity does not hold the requested capability.
    #[error("permission denied: missing capability '{0}'")]
    PermissionDenied(Capability),

    /// Any other failure reported by the auth service, with its
    /// original cause attached.
    #[error("auth service error: {0}")]
    Remote(#[source] BoxError),
}

impl SessionError {
    /// Wraps an arbitrary error as [`SessionError::Remote`].
    pub fn remote(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Remote(Box::new(error))
    }

    /// Returns `true` if this error means the current session is dead.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionExpiredOrInvalid(_))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_remote_keeps_original_cause() {
        let io = std::io::Error::other("disk on fire");
        let err = SessionError::remote(io);

        assert!(err.to_string().contains("disk on fire"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_permission_denied_names_capability() {
        let err = SessionError::PermissionDenied(Capability::BACKUP_MANAGE);

        assert_eq!(
            err.to_string(),
            "permission denied: missing capability 'backup_manage'"
        );
    }

    #[test]
    fn test_is_session_invalid() {
        assert!(SessionError::SessionExpiredOrInvalid("401".into()).is_session_invalid());
        assert!(!SessionError::NetworkFailure("refused".into()).is_session_invalid());
    }
}
