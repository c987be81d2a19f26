//! The HTTP client pipeline.
//!
//! Every outbound call made on behalf of the console goes through one
//! [`ApiClient`]. It wraps a generic [`HttpTransport`] with a request
//! phase and a response phase so each call site gets the same credential
//! handling and the same user feedback.
//!
//! ```text
//!            ┌─ request phase ─┐                ┌─ response phase ──────────────────────┐
//! caller ──→ │ attach bearer   │ ──transport──→ │ 200/201      → pass through            │
//!            │ token if any    │                │ other status → notify, reject          │
//!            └─────────────────┘                │   401        → + re-login prompt task  │
//!                                               │ transport err→ notify, reject original │
//!                                               │   401        → + invalidate, signal    │
//!                                               └────────────────────────────────────────┘
//! ```
//!
//! There is no silent token refresh. A dead session is invalidated and
//! the host is told through [`SessionInvalidated`](adminward_session::SessionInvalidated).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use adminward_protocol::{Codec, ErrorBody, JsonCodec};
use adminward_session::{InvalidationCause, Notice, Notifier, Prompt, SessionContext};
use adminward_transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ApiError;

/// Statuses the pipeline treats as success.
pub const SUCCESS_STATUSES: [u16; 2] = [200, 201];

const UNAUTHORIZED: u16 = 401;

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Texts and timings the pipeline shows the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Shown when the server gives no message of its own.
    pub generic_error: String,
    /// Shown when a transport-level `401` ends the session.
    pub unauthorized_message: String,
    /// The blocking prompt for a `401` the transport let through.
    pub relogin_prompt: Prompt,
    pub notice_duration: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generic_error: "请求错误".into(),
            unauthorized_message: "未经授权，请重新登录".into(),
            relogin_prompt: Prompt::default(),
            notice_duration: Notice::DEFAULT_DURATION,
        }
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

struct Inner<T, N> {
    transport: T,
    session: Arc<SessionContext>,
    notifier: Arc<N>,
    codec: JsonCodec,
    config: PipelineConfig,
    prompt_open: AtomicBool,
}

/// The request/response pipeline around a transport.
///
/// Cheap to clone; clones share the transport, the session and the
/// re-login prompt state.
pub struct ApiClient<T, N> {
    inner: Arc<Inner<T, N>>,
}

impl<T, N> Clone for ApiClient<T, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: HttpTransport, N: Notifier> ApiClient<T, N> {
    pub fn new(
        transport: T,
        session: Arc<SessionContext>,
        notifier: Arc<N>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                session,
                notifier,
                codec: JsonCodec,
                config,
                prompt_open: AtomicBool::new(false),
            }),
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.inner.session
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Returns `true` while a re-login prompt is waiting for an answer.
    pub fn is_prompt_open(&self) -> bool {
        self.inner.prompt_open.load(Ordering::Acquire)
    }

    /// Sends `request` through the pipeline.
    ///
    /// Resolves only for `200`/`201`. Every rejection has already been
    /// shown to the operator. A `401` response also opens the re-login
    /// prompt on a spawned task; the call does not wait for the answer.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - [`ApiError::Application`] — the transport returned a response
    ///   with any other status
    /// - [`ApiError::Transport`] — the transport failed; the original
    ///   error, unmodified
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(token) = self.inner.session.token() {
            request.set_header("Authorization", token.bearer());
        }
        let method = request.method;
        let path = request.path.clone();

        match self.inner.transport.send(request).await {
            Ok(response) if SUCCESS_STATUSES.contains(&response.status) => {
                tracing::debug!(%method, %path, status = response.status, "request succeeded");
                Ok(response)
            }
            Ok(response) => Err(self.reject_response(method, &path, response)),
            Err(err) => Err(self.reject_transport_error(method, &path, err)),
        }
    }

    // Success path: the transport handed back a status we don't accept.
    fn reject_response(&self, method: Method, path: &str, response: HttpResponse) -> ApiError {
        let status = response.status;
        let message = ErrorBody::message_from(&response.body)
            .unwrap_or_else(|| self.inner.config.generic_error.clone());
        tracing::warn!(%method, %path, status, %message, "request rejected by server");
        self.notify(&message);

        if status == UNAUTHORIZED {
            self.open_relogin_prompt();
        }
        ApiError::Application { status, message }
    }

    // Transport-error path: always rejects with the original error.
    fn reject_transport_error(&self, method: Method, path: &str, err: TransportError) -> ApiError {
        let message = match err.status() {
            Some(UNAUTHORIZED) => {
                self.inner.session.invalidate_with(InvalidationCause::Unauthorized);
                self.inner.config.unauthorized_message.clone()
            }
            Some(_) => err
                .body()
                .and_then(ErrorBody::message_from)
                .unwrap_or_else(|| self.inner.config.generic_error.clone()),
            None => err.to_string(),
        };
        tracing::warn!(%method, %path, status = err.status(), error = %err, "request failed");
        self.notify(&message);
        ApiError::Transport(err)
    }

    // The prompt runs on its own task so the rejected call settles at
    // once. At most one prompt is open at a time; 401s arriving meanwhile
    // only get their notice.
    fn open_relogin_prompt(&self) {
        if self.inner.prompt_open.swap(true, Ordering::AcqRel) {
            tracing::debug!("re-login prompt already open");
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _slot = PromptSlot(&inner.prompt_open);
            if inner.notifier.confirm(&inner.config.relogin_prompt).await {
                inner
                    .session
                    .invalidate_with(InvalidationCause::ReloginConfirmed);
            } else {
                tracing::info!("re-login declined, staying on page");
            }
        });
    }

    fn notify(&self, message: &str) {
        self.inner
            .notifier
            .notify(Notice::error(message).with_duration(self.inner.config.notice_duration));
    }

    // -- Verb helpers -----------------------------------------------------

    /// `GET path?query` and decode the reply.
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, ApiError> {
        let mut request = HttpRequest::get(path);
        for (key, value) in query {
            request = request.with_query(*key, *value);
        }
        let response = self.send(request).await?;
        self.decode(&response)
    }

    /// `POST path` with a JSON body and decode the reply.
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = self.with_body(HttpRequest::post(path), body)?;
        let response = self.send(request).await?;
        self.decode(&response)
    }

    /// `PUT path` with a JSON body and decode the reply.
    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = self.with_body(HttpRequest::new(Method::Put, path), body)?;
        let response = self.send(request).await?;
        self.decode(&response)
    }

    /// `DELETE path`. The reply body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::Delete, path)).await?;
        Ok(())
    }

    /// Encodes `body` into `request` with the matching content type.
    pub fn with_body<B: Serialize>(
        &self,
        request: HttpRequest,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let bytes = self.inner.codec.encode(body)?;
        Ok(request
            .with_header("Content-Type", self.inner.codec.content_type())
            .with_body(bytes))
    }

    /// Decodes a reply body.
    pub fn decode<R: DeserializeOwned>(&self, response: &HttpResponse) -> Result<R, ApiError> {
        Ok(self.inner.codec.decode(&response.body)?)
    }

    /// Decodes a reply body that may be absent. An empty body or JSON
    /// `null` is `None`.
    pub fn decode_optional<R: DeserializeOwned>(
        &self,
        response: &HttpResponse,
    ) -> Result<Option<R>, ApiError> {
        if response.is_empty() {
            return Ok(None);
        }
        Ok(self.inner.codec.decode::<Option<R>>(&response.body)?)
    }
}

struct PromptSlot<'a>(&'a AtomicBool);

impl Drop for PromptSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
