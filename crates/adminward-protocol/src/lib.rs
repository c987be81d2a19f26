//! Wire protocol for Adminward.
//!
//! This crate defines what the console and the auth service say to each
//! other:
//!
//! - **Types** ([`Credentials`], [`LoginResponse`], [`Identity`],
//!   [`Token`], [`Role`], [`ErrorBody`]) — the bodies that travel on the
//!   wire and the identity blob that gets cached locally.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (typed bodies) → Session (token, identity)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{Credentials, ErrorBody, Identity, LoginResponse, Role, Token};
