//! The remote auth service seam.
//!
//! Adminward does not issue or verify tokens. That is the server's job.
//! The session layer only needs two remote calls, and [`AuthService`]
//! names exactly those: exchange credentials for a token, and fetch the
//! identity the current token belongs to.
//!
//! The production implementation lives in the `adminward` crate, where it
//! runs through the HTTP client pipeline. Tests plug in scripted doubles.

use std::future::Future;

use adminward_protocol::{Credentials, Identity, LoginResponse};

use crate::SessionError;

/// Talks to the remote auth endpoints.
///
/// # Trait bounds
///
/// - `Send + Sync` → the service is shared between the navigation guard
///   and whatever UI task triggers a login.
/// - `'static` → it lives as long as the session store that owns it.
///
/// # Example
///
/// ```rust
/// use adminward_protocol::{Credentials, Identity, LoginResponse, Role};
/// use adminward_session::{AuthService, SessionError};
///
/// /// Accepts one hard-coded account. Handy for demos, useless otherwise.
/// struct DemoAuth;
///
/// impl AuthService for DemoAuth {
///     async fn login(
///         &self,
///         credentials: &Credentials,
///     ) -> Result<LoginResponse, SessionError> {
///         if credentials.username == "demo" && credentials.password == "demo" {
///             Ok(LoginResponse {
///                 access_token: "demo-token".into(),
///                 message: None,
///             })
///         } else {
///             Err(SessionError::InvalidCredentials("unknown account".into()))
///         }
///     }
///
///     async fn fetch_profile(&self) -> Result<Option<Identity>, SessionError> {
///         Ok(Some(Identity::new("demo", Role::OPERATOR)))
///     }
/// }
/// ```
pub trait AuthService: Send + Sync + 'static {
    /// Exchanges a username/password pair for an access token.
    ///
    /// # Errors
    /// - [`SessionError::InvalidCredentials`] — the server rejected them
    /// - [`SessionError::NetworkFailure`] — no response arrived
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, SessionError>> + Send;

    /// Fetches the identity for the token the caller is currently sending.
    ///
    /// `Ok(None)` means the server answered without a body, which the
    /// session store treats as an invalid session.
    fn fetch_profile(
        &self,
    ) -> impl Future<Output = Result<Option<Identity>, SessionError>> + Send;
}
