//! Wire types exchanged with the auth service.
//!
//! Every type here is something that is serialized into a request body,
//! deserialized out of a response body, or persisted as JSON by the
//! credential store.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// An opaque bearer credential proving an authenticated session.
///
/// The value is never interpreted on the client. `Debug` redacts it so a
/// stray `?token` in a log line cannot leak the credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for an empty (or whitespace-only) token, which
    /// counts as no token at all.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role name attached to an identity.
///
/// Roles are opaque strings on the wire. Mapping a role to the
/// capabilities it grants is the permission table's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The distinguished role that holds every capability.
    pub const SUPER_ADMIN: Role = Role(Cow::Borrowed("super_admin"));
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const OPERATOR: Role = Role(Cow::Borrowed("operator"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_super_admin(&self) -> bool {
        self.as_str() == Self::SUPER_ADMIN.as_str()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Request body for the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Response body of a successful login.
///
/// Only `access_token` matters to the session layer; the server also
/// echoes a message and a user summary, which are ignored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The server-confirmed record describing the current operator.
///
/// Fields the session layer relies on are typed; anything else the
/// profile endpoint returns (`id`, `created_at`, `last_login`, ...) is
/// kept in `extra` so the cached copy round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            email: None,
            extra: Map::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ErrorBody
// ---------------------------------------------------------------------------

/// The error envelope the server uses for failed calls:
/// `{ "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Pulls a non-empty server message out of a raw response body.
    ///
    /// Lenient on purpose: bodies that aren't JSON, aren't objects, or
    /// carry no usable `message` all yield `None`.
    pub fn message_from(body: &[u8]) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        parsed
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
