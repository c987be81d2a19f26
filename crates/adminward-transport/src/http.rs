//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use crate::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// A `reqwest`-based [`HttpTransport`] rooted at a base URL.
///
/// By default any status outside `2xx` is returned as
/// [`TransportError::Status`], the way most HTTP client libraries behave.
/// [`accept_all_statuses`](Self::accept_all_statuses) turns that off so
/// every answered request comes back as `Ok`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    reject_error_status: bool,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a transport for `base_url` with a per-request timeout.
    ///
    /// # Errors
    /// [`TransportError::InvalidRequest`] if `base_url` is not an absolute
    /// `http://` or `https://` URL. There is no page origin to resolve
    /// relative paths against.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !is_absolute(&base_url) {
            return Err(TransportError::InvalidRequest(format!(
                "base URL {base_url:?} must start with http:// or https://"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        tracing::debug!(%base_url, ?timeout, "HTTP transport ready");
        Ok(Self {
            client,
            base_url,
            reject_error_status: true,
        })
    }

    /// Hands every answered request back as `Ok`, whatever its status.
    pub fn accept_all_statuses(mut self) -> Self {
        self.reject_error_status = false;
        self
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.url_for(&request.path);

        let mut builder = self.client.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(classify)?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes().await.map_err(classify)?.to_vec();

        tracing::debug!(method = %request.method, %url, status, "HTTP response");

        if self.reject_error_status && !(200..300).contains(&status) {
            return Err(TransportError::Status { status, body });
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Maps a `reqwest` error onto the transport's own taxonomy.
fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_relative_paths() {
        let t = ReqwestTransport::new("http://127.0.0.1:5000/").unwrap();

        assert_eq!(t.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            t.url_for("/api/auth/login"),
            "http://127.0.0.1:5000/api/auth/login"
        );
        assert_eq!(
            t.url_for("api/auth/login"),
            "http://127.0.0.1:5000/api/auth/login"
        );
    }

    #[test]
    fn test_url_for_passes_absolute_urls_through() {
        let t = ReqwestTransport::new("http://127.0.0.1:5000").unwrap();

        assert_eq!(t.url_for("https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn test_new_relative_or_empty_base_is_rejected() {
        for base in ["", "  ", "/prod-api", "127.0.0.1:5000"] {
            let err = ReqwestTransport::new(base).unwrap_err();
            assert!(matches!(err, TransportError::InvalidRequest(_)), "for {base:?}");
        }
    }
}
