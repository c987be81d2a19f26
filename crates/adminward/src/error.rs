//! Error types for the Adminward console core.

use adminward_protocol::ProtocolError;
use adminward_router::RouterError;
use adminward_session::SessionError;
use adminward_transport::TransportError;

/// Why a call through the client pipeline was rejected.
///
/// The operator has already been notified by the time a caller sees one
/// of these. Callers should not notify again.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport itself failed. This is the transport's own error,
    /// passed through untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server answered with a status other than `200`/`201`.
    #[error("{message} (status {status})")]
    Application { status: u16, message: String },
}

impl ApiError {
    /// The HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status(),
            Self::Protocol(_) => None,
            Self::Application { status, .. } => Some(*status),
        }
    }

    /// Returns `true` if the server said the session is not valid.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// A configuration value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `adminward` crate you deal with this single error type
/// instead of importing errors from each sub-crate; `?` converts them.
#[derive(Debug, thiserror::Error)]
pub enum AdminwardError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_from_each_variant() {
        let transport = ApiError::Transport(TransportError::Status {
            status: 401,
            body: Vec::new(),
        });
        let application = ApiError::Application {
            status: 500,
            message: "boom".into(),
        };

        assert_eq!(transport.status(), Some(401));
        assert!(transport.is_unauthorized());
        assert_eq!(application.status(), Some(500));
        assert_eq!(ApiError::Transport(TransportError::Timeout).status(), None);
    }

    #[test]
    fn test_api_error_transport_display_is_transparent() {
        let err = ApiError::from(TransportError::Connect("refused".into()));

        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn test_from_session_error() {
        let err: AdminwardError = SessionError::NetworkFailure("down".into()).into();

        assert!(matches!(err, AdminwardError::Session(_)));
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn test_from_router_error() {
        let err: AdminwardError = RouterError::NoMatch("/x".into()).into();

        assert!(matches!(err, AdminwardError::Router(_)));
    }

    #[test]
    fn test_from_api_error() {
        let err: AdminwardError = ApiError::Application {
            status: 403,
            message: "forbidden".into(),
        }
        .into();

        assert!(matches!(err, AdminwardError::Api(_)));
    }
}
