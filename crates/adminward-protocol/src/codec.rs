//! Codec trait and the JSON implementation used for request and
//! response bodies.
//!
//! The client pipeline never calls `serde_json` directly. It goes
//! through a [`Codec`], so the body format is decided in one place.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values into body bytes and decodes body bytes into values.
///
/// `Send + Sync + 'static` because the codec is owned by a client that
/// is shared across tasks.
pub trait Codec: Send + Sync + 'static {
    /// The `Content-Type` this codec produces.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into body bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value can't be
    /// represented in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes body bytes into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that speaks JSON (via `serde_json`).
///
/// ```rust
/// use adminward_protocol::{Codec, Credentials, JsonCodec};
///
/// let codec = JsonCodec;
/// let body = codec
///     .encode(&Credentials::new("alice", "secret"))
///     .unwrap();
/// assert_eq!(body, br#"{"username":"alice","password":"secret"}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
