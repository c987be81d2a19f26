//! The remote auth endpoints, called through the client pipeline.

use adminward_protocol::{Credentials, Identity, LoginResponse};
use adminward_session::{AuthService, Notifier, SessionError};
use adminward_transport::{HttpRequest, HttpTransport};

use crate::{ApiClient, ApiError};

/// Login endpoint: `{username, password}` → `{access_token, ...}`.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Profile endpoint: bearer token → identity, or an empty body.
pub const PROFILE_PATH: &str = "/api/auth/profile";

/// [`AuthService`] backed by the console's HTTP API.
///
/// Calls go through the same [`ApiClient`] as everything else, so a `401`
/// on the profile call gets the usual invalidate-and-notify treatment.
pub struct AuthApi<T, N> {
    client: ApiClient<T, N>,
}

impl<T: HttpTransport, N: Notifier> AuthApi<T, N> {
    pub fn new(client: ApiClient<T, N>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T, N> {
        &self.client
    }
}

impl<T: HttpTransport, N: Notifier> AuthService for AuthApi<T, N> {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, SessionError> {
        let request = self
            .client
            .with_body(HttpRequest::post(LOGIN_PATH), credentials)
            .map_err(SessionError::remote)?;
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| classify(e, Endpoint::Login))?;
        self.client.decode(&response).map_err(SessionError::remote)
    }

    async fn fetch_profile(&self) -> Result<Option<Identity>, SessionError> {
        let response = self
            .client
            .send(HttpRequest::get(PROFILE_PATH))
            .await
            .map_err(|e| classify(e, Endpoint::Profile))?;
        self.client
            .decode_optional(&response)
            .map_err(SessionError::remote)
    }
}

#[derive(Clone, Copy)]
enum Endpoint {
    Login,
    Profile,
}

// Maps a pipeline rejection onto the session error taxonomy.
fn classify(err: ApiError, endpoint: Endpoint) -> SessionError {
    match (err.status(), endpoint) {
        (Some(401), Endpoint::Login) => SessionError::InvalidCredentials(err.to_string()),
        (Some(401), Endpoint::Profile) => SessionError::SessionExpiredOrInvalid(err.to_string()),
        (None, _) if matches!(err, ApiError::Transport(_)) => {
            SessionError::NetworkFailure(err.to_string())
        }
        _ => SessionError::remote(err),
    }
}

#[cfg(test)]
mod tests {
    use adminward_transport::TransportError;

    use super::*;

    #[test]
    fn test_classify_login_401_is_invalid_credentials() {
        let err = ApiError::Application {
            status: 401,
            message: "用户名或密码错误".into(),
        };

        assert!(matches!(
            classify(err, Endpoint::Login),
            SessionError::InvalidCredentials(m) if m.contains("用户名或密码错误")
        ));
    }

    #[test]
    fn test_classify_profile_401_is_invalid_session() {
        let err = ApiError::Transport(TransportError::Status {
            status: 401,
            body: Vec::new(),
        });

        assert!(classify(err, Endpoint::Profile).is_session_invalid());
    }

    #[test]
    fn test_classify_no_status_is_network_failure() {
        let err = ApiError::Transport(TransportError::Timeout);

        assert!(matches!(
            classify(err, Endpoint::Profile),
            SessionError::NetworkFailure(_)
        ));
    }

    #[test]
    fn test_classify_other_status_is_remote_with_source() {
        use std::error::Error;

        let err = ApiError::Application {
            status: 500,
            message: "boom".into(),
        };
        let classified = classify(err, Endpoint::Login);

        assert!(matches!(classified, SessionError::Remote(_)));
        assert!(classified.source().is_some());
    }
}
