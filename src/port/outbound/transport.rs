//! HTTP transport port.
//!
//! The API clients build [`HttpRequest`] values and hand them to an
//! [`HttpTransport`]; retry policy and the real network stack live in
//! adapters, so the auth-retry pipeline can be exercised against scripted
//! responses.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Request body encodings used by the marketplace endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/json` body.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` key/value pairs.
    Form(Vec<(String, String)>),
}

/// An outbound POST request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// Create a JSON POST request.
    pub fn json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    /// Create a form-encoded POST request.
    pub fn form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Form(fields),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive name match).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header, when the server sent one in seconds.
    pub retry_after: Option<Duration>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP requests.
///
/// Implementations return `Ok` for every response the server produced,
/// whatever its status; `Err` is reserved for failures where no response
/// arrived (connect errors, timeouts), reported as
/// [`Error::Connection`](crate::error::Error::Connection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}
