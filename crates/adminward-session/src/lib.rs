//! Operator session management for Adminward.
//!
//! This crate owns the answer to "who is the current operator, and what
//! may they do":
//!
//! 1. **Persistence** — the token and cached identity survive restarts
//!    ([`CredentialStore`], [`FileCredentialStore`])
//! 2. **Session state** — the shared, observable `{token, identity}` pair
//!    ([`SessionContext`])
//! 3. **Actions** — login, identity fetch, logout, invalidate
//!    ([`SessionStore`] over an [`AuthService`])
//! 4. **Permissions** — role → capability evaluation ([`PermissionTable`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router / client pipeline (above)  ← read the session, clear it on 401
//!     ↕
//! Session Layer (this crate)  ← token, identity, permissions
//!     ↕
//! Protocol Layer (below)  ← Token, Identity, Credentials types
//! ```

mod auth;
mod credentials;
mod error;
mod manager;
mod notify;
mod permission;
mod session;

pub use auth::AuthService;
pub use credentials::{
    CredentialStore, FileCredentialStore, IDENTITY_KEY, MemoryCredentialStore, TOKEN_KEY,
};
pub use error::{BoxError, SessionError};
pub use manager::SessionStore;
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier, Prompt};
pub use permission::{Capability, PermissionTable, has_permission};
pub use session::{
    InvalidationCause, SessionContext, SessionInvalidated, SessionPhase, SessionState,
};
