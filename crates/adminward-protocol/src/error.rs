//! Error types for the protocol layer.
//!
//! A `ProtocolError` means the bytes were there but could not be turned
//! into (or produced from) the value we wanted. Network trouble is a
//! transport error; a rejected session is a session error.

/// Errors that can occur while encoding or decoding message bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into body bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning body bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// server that answered with an HTML error page.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body decoded, but is not acceptable at the protocol level,
    /// e.g. an empty body where a record was required.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
