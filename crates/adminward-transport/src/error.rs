/// Errors that can occur in the transport layer.
///
/// A transport error means the call never produced a response the
/// transport was willing to hand back. That covers two very different
/// situations, and callers need to tell them apart:
///
/// - the server answered, but with a status the transport rejects
///   ([`TransportError::Status`]), and
/// - no answer arrived at all (connect failure, timeout, ...).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server responded with a status the transport treats as a
    /// failure (by default anything outside `2xx`).
    ///
    /// The raw body is kept so upper layers can pull a server-provided
    /// message out of it.
    #[error("server responded with status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The raw response body.
        body: Vec<u8>,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (bad URL, bad header, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other failure while sending or receiving.
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns the HTTP status carried by this error, if the server
    /// answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body carried by this error, if any.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
