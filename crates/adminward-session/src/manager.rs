//! The session store: the action set that drives a [`SessionContext`].
//!
//! [`SessionStore`] pairs the shared context with the remote
//! [`AuthService`] and a [`PermissionTable`]. It owns the four session
//! actions:
//!
//! | Action | Network | Can fail |
//! |---|---|---|
//! | [`login`](SessionStore::login) | yes | yes |
//! | [`fetch_identity`](SessionStore::fetch_identity) | yes | yes |
//! | [`logout`](SessionStore::logout) | no | no |
//! | [`invalidate`](SessionStore::invalidate) | no | no |
//!
//! Failed actions never touch the session. In particular `fetch_identity`
//! does not invalidate on error; deciding that is the caller's business
//! (the navigation guard does, the request pipeline does on `401`).
//!
//! # Concurrency note
//!
//! Concurrent logins are not deduplicated: each one calls the server and
//! the last to finish wins. An identity fetch that settles after the
//! token changed is returned to its caller but not stored.

use std::sync::Arc;

use adminward_protocol::{Credentials, Identity, Token};

use crate::{
    AuthService, Capability, PermissionTable, SessionContext, SessionError,
    SessionPhase,
};

/// Session actions bound to one auth service.
pub struct SessionStore<A> {
    context: Arc<SessionContext>,
    auth: A,
    permissions: PermissionTable,
}

impl<A: AuthService> SessionStore<A> {
    /// Creates a store over `context` using the default permission table.
    pub fn new(context: Arc<SessionContext>, auth: A) -> Self {
        Self {
            context,
            auth,
            permissions: PermissionTable::default(),
        }
    }

    /// Replaces the permission table.
    pub fn with_permissions(mut self, permissions: PermissionTable) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Exchanges credentials for a token and makes it current.
    ///
    /// The username is trimmed before it is sent. On failure the session
    /// is left exactly as it was.
    ///
    /// # Errors
    /// Whatever the auth service reports, unmodified. A response without
    /// an access token is [`SessionError::SessionExpiredOrInvalid`].
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials::new(username.trim(), password);
        let response = self.auth.login(&credentials).await.inspect_err(|e| {
            tracing::info!(username = %credentials.username, error = %e, "login failed");
        })?;

        let token = Token::new(response.access_token);
        if token.is_blank() {
            return Err(SessionError::SessionExpiredOrInvalid(
                "login response carried no access token".into(),
            ));
        }

        self.context.establish(token);
        tracing::info!(username = %credentials.username, "logged in");
        Ok(())
    }

    /// Fetches the identity for the current token and caches it.
    ///
    /// # Errors
    /// - [`SessionError::SessionExpiredOrInvalid`] — no token, an empty
    ///   profile body, or the session was cleared mid-flight
    /// - anything else the auth service reports, unmodified
    pub async fn fetch_identity(&self) -> Result<Identity, SessionError> {
        let token = self.context.token().ok_or_else(|| {
            SessionError::SessionExpiredOrInvalid("no session token".into())
        })?;

        let identity = self.auth.fetch_profile().await?.ok_or_else(|| {
            SessionError::SessionExpiredOrInvalid("profile response was empty".into())
        })?;

        if self.context.accept_identity(&token, identity.clone())? {
            tracing::info!(
                username = %identity.username,
                role = %identity.role,
                "identity loaded"
            );
        } else {
            tracing::debug!(
                username = %identity.username,
                "token changed during identity fetch, result not cached"
            );
        }
        Ok(identity)
    }

    /// Operator-initiated sign-out. Never fails, safe to repeat.
    pub fn logout(&self) {
        self.context.logout();
    }

    /// Clears the session after the server rejected it. Never fails,
    /// safe to repeat.
    pub fn invalidate(&self) {
        self.context.invalidate();
    }

    /// Checks `capability` against the best identity available.
    pub fn has_permission(&self, capability: &Capability) -> bool {
        let identity = self.context.cached_identity();
        self.permissions.has_permission(identity.as_ref(), capability)
    }

    /// Like [`has_permission`](Self::has_permission), but a deny is an
    /// error.
    pub fn require(&self, capability: &Capability) -> Result<(), SessionError> {
        let identity = self.context.cached_identity();
        self.permissions.require(identity.as_ref(), capability)
    }

    pub fn token(&self) -> Option<Token> {
        self.context.token()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.context.identity()
    }

    pub fn phase(&self) -> SessionPhase {
        self.context.phase()
    }
}

// =========================================================================
// Tests
// =========================================================================
