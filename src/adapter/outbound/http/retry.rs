//! Transport-level retry.
//!
//! Retries rate-limited and server-error responses plus connection failures
//! with exponential backoff. Tokens are not touched here; auth-aware retry
//! belongs to the GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{ApiError, Error, Result};
use crate::port::{HttpRequest, HttpResponse, HttpTransport};

/// Upper bound for any single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Longest response body excerpt carried into error messages.
const BODY_EXCERPT: usize = 200;

/// Statuses retried by [`RetryingTransport`].
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Retry limits and backoff shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff base in seconds.
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    ///
    /// The first retry is immediate; retry `n` then waits
    /// `backoff_factor * 2^(n-1)` seconds. A server-provided `Retry-After`
    /// overrides the computed delay. Both are capped at two minutes.
    #[must_use]
    pub fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint.min(MAX_BACKOFF);
        }
        if retry <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs >= MAX_BACKOFF.as_secs_f64() {
            return MAX_BACKOFF;
        }
        Duration::from_secs_f64(secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
        }
    }
}

/// Wrapper that adds automatic retry to any [`HttpTransport`].
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: HttpTransport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for RetryingTransport<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut retry = 0;

        loop {
            let outcome = self.inner.send(request.clone()).await;

            let (reason, hint) = match &outcome {
                Ok(response) if is_retryable_status(response.status) => {
                    let hint = if matches!(response.status, 429 | 503) {
                        response.retry_after
                    } else {
                        None
                    };
                    (format!("HTTP {}", response.status), hint)
                }
                Err(Error::Connection(msg)) => (msg.clone(), None),
                _ => return outcome,
            };

            if retry >= self.policy.max_retries {
                let detail = match outcome {
                    Ok(response) => format!(
                        "{reason} after {retry} retries: {}",
                        excerpt(&response.body)
                    ),
                    Err(_) => format!("{reason} after {retry} retries"),
                };
                return Err(ApiError::Transient(detail).into());
            }

            retry += 1;
            let delay = self.policy.delay(retry, hint);
            warn!(
                url = %request.url,
                attempt = retry,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "HTTP request failed, retrying"
            );
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
