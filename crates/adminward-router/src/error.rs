//! Error types for the routing layer.

/// Errors that can occur while resolving a navigation target.
///
/// Guard decisions are never errors: a denied navigation is a redirect.
/// These only cover targets the router cannot make sense of.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The target is not an absolute in-app path, or is badly encoded.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Route-level redirects kept bouncing without settling.
    #[error("redirect loop while resolving '{0}'")]
    RedirectLoop(String),

    /// Nothing matched, not even the not-found route.
    #[error("no route matches '{0}'")]
    NoMatch(String),
}

impl RouterError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
