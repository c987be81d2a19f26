//! The session context: process-wide `{token, identity}` state.
//!
//! A [`SessionContext`] is created once by the application root and shared
//! (`Arc`) with everything that needs to read or clear the session: the
//! navigation guard, the HTTP client pipeline, the UI.
//!
//! It is the only owner of the current token. Every mutation goes through
//! one of its methods, and each method mirrors the change into the
//! [`CredentialStore`] before publishing it in memory. Mutations are
//! serialized among themselves, so memory and durable storage never
//! disagree about whether a session exists once a method returns.
//!
//! # Change notification
//!
//! - [`subscribe`](SessionContext::subscribe) yields a `watch` receiver of
//!   the current [`SessionState`]; it fires on every visible change.
//! - [`subscribe_invalidations`](SessionContext::subscribe_invalidations)
//!   yields a `broadcast` receiver of [`SessionInvalidated`] events. This
//!   is where a host decides to hard-reload or soft-navigate to login.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use adminward_protocol::{Identity, Token};
use tokio::sync::{broadcast, watch};

use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::SessionError;

const INVALIDATION_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Which of the three authentication states the session is in.
///
/// ```text
///   NoToken ──(login)──→ TokenNoIdentity ──(identity fetched)──→ TokenWithIdentity
///      ↑                        │                                      │
///      └────────────(logout / invalidate)──────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    NoToken,
    TokenNoIdentity,
    TokenWithIdentity,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// A snapshot of the session.
///
/// Invariant: `identity` is only ever `Some` while `token` is `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    token: Option<Token>,
    identity: Option<Identity>,
}

impl SessionState {
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.token, &self.identity) {
            (None, _) => SessionPhase::NoToken,
            (Some(_), None) => SessionPhase::TokenNoIdentity,
            (Some(_), Some(_)) => SessionPhase::TokenWithIdentity,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

// ---------------------------------------------------------------------------
// SessionInvalidated
// ---------------------------------------------------------------------------

/// Why the session was torn down by the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidationCause {
    /// A call failed at the transport level with `401`.
    Unauthorized,
    /// A call answered `401` and the operator confirmed the re-login prompt.
    ReloginConfirmed,
}

/// Boundary signal: the session is gone and the host should restart from
/// a clean state (reload, or navigate to login).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionInvalidated {
    pub cause: InvalidationCause,
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// Shared, injectable session state.
///
/// Mutations are serialized on `writes`, which also covers the
/// [`CredentialStore`] I/O. The `watch` lock is only taken for the
/// in-memory swap, so readers never wait on storage.
pub struct SessionContext {
    state: watch::Sender<SessionState>,
    credentials: Arc<dyn CredentialStore>,
    invalidations: broadcast::Sender<SessionInvalidated>,
    writes: Mutex<()>,
}

impl SessionContext {
    /// Boots a context from durable storage.
    ///
    /// Only the token is restored. The cached identity is not trusted
    /// until it has been fetched again with that token.
    pub fn restore(credentials: Arc<dyn CredentialStore>) -> Self {
        let state = SessionState {
            token: credentials.get(),
            identity: None,
        };
        tracing::debug!(restored = state.token.is_some(), "session context created");
        Self {
            state: watch::channel(state).0,
            credentials,
            invalidations: broadcast::channel(INVALIDATION_CAPACITY).0,
            writes: Mutex::new(()),
        }
    }

    /// A context backed by a fresh [`MemoryCredentialStore`].
    pub fn in_memory() -> Self {
        Self::restore(Arc::new(MemoryCredentialStore::new()))
    }

    pub fn token(&self) -> Option<Token> {
        self.state.borrow().token.clone()
    }

    /// The identity confirmed with the current token, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// The best identity available for display and permission checks:
    /// the in-memory one, else the durable cached copy. Always `None`
    /// without a token.
    pub fn cached_identity(&self) -> Option<Identity> {
        let (has_token, identity) = {
            let state = self.state.borrow();
            (state.token.is_some(), state.identity.clone())
        };
        if !has_token {
            return None;
        }
        identity.or_else(|| self.credentials.cached_identity())
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Subscribes to [`SessionInvalidated`] events.
    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.invalidations.subscribe()
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Installs a freshly issued token. Any previous identity belonged to
    /// the old token and is dropped.
    pub(crate) fn establish(&self, token: Token) {
        let _writes = self.write_lock();
        self.credentials.set(&token);
        self.credentials.clear_cached_identity();
        self.state.send_modify(|s| {
            s.token = Some(token);
            s.identity = None;
        });
    }

    /// Stores `identity` if it was fetched with the token that is still
    /// current.
    ///
    /// Returns `Ok(false)` when the token changed while the fetch was in
    /// flight; the identity is then left out. Fails if the session was
    /// cleared in the meantime.
    pub(crate) fn accept_identity(
        &self,
        fetched_with: &Token,
        identity: Identity,
    ) -> Result<bool, SessionError> {
        let _writes = self.write_lock();
        // Only writers change the token, and they all hold `writes`.
        match self.token() {
            None => Err(SessionError::SessionExpiredOrInvalid(
                "session was cleared while fetching identity".into(),
            )),
            Some(current) if current != *fetched_with => Ok(false),
            Some(_) => {
                self.credentials.set_cached_identity(&identity);
                self.state.send_modify(|s| s.identity = Some(identity));
                Ok(true)
            }
        }
    }

    /// Clears the session after the server rejected it. Idempotent.
    pub fn invalidate(&self) {
        if self.clear() {
            tracing::info!("session invalidated");
        }
    }

    /// Clears the session at the operator's request. Idempotent.
    pub fn logout(&self) {
        if self.clear() {
            tracing::info!("logged out");
        }
    }

    /// Clears the session and emits [`SessionInvalidated`], but only if
    /// there was a token to clear. However many callers race here, each
    /// token produces at most one event.
    ///
    /// Returns whether this call emitted the event.
    pub fn invalidate_with(&self, cause: InvalidationCause) -> bool {
        let had_token = {
            let _writes = self.write_lock();
            let had_token = self.state.borrow().token.is_some();
            self.clear_locked();
            had_token
        };
        if had_token {
            tracing::warn!(?cause, "session invalidated, host should restart navigation");
            // No receivers just means nobody is listening yet.
            let _ = self.invalidations.send(SessionInvalidated { cause });
        }
        had_token
    }

    fn clear(&self) -> bool {
        let _writes = self.write_lock();
        self.clear_locked()
    }

    // Durable entries are wiped even if memory was already empty, so a
    // stray entry written by another process cannot resurrect a session.
    // Caller holds `writes`.
    fn clear_locked(&self) -> bool {
        self.credentials.clear();
        self.credentials.clear_cached_identity();
        self.state.send_if_modified(|s| {
            let had_session = s.token.is_some() || s.identity.is_some();
            s.token = None;
            s.identity = None;
            had_session
        })
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
