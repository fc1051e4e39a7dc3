//! Pushover notifier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use super::format;
use crate::domain::{Analysis, Posting};
use crate::error::{ApiError, ConfigError, Result};
use crate::port::{HttpRequest, HttpTransport, PostingNotifier};

/// Pushover messages endpoint.
pub const API_URL: &str = "https://api.pushover.net/1/messages.json";

pub const PUSHOVER_API_TOKEN: &str = "PUSHOVER_API_TOKEN";
pub const PUSHOVER_USER_KEY: &str = "PUSHOVER_USER_KEY";

/// Pushover application credentials.
#[derive(Clone)]
pub struct PushoverConfig {
    pub api_token: String,
    pub user_key: String,
}

impl PushoverConfig {
    /// Read `PUSHOVER_API_TOKEN` and `PUSHOVER_USER_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first unset variable.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let read = |key: &'static str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingField { field: key })
        };
        Ok(Self {
            api_token: read(PUSHOVER_API_TOKEN)?,
            user_key: read(PUSHOVER_USER_KEY)?,
        })
    }
}

impl std::fmt::Debug for PushoverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverConfig")
            .field("api_token", &"<redacted>")
            .field("user_key", &"<redacted>")
            .finish()
    }
}

/// Sends postings as Pushover push notifications.
pub struct PushoverNotifier {
    config: PushoverConfig,
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl PushoverNotifier {
    pub fn new(config: PushoverConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            endpoint: API_URL.to_string(),
        }
    }

    /// Override the endpoint (for tests against a local server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn fields(&self, posting: &Posting, analysis: Option<&Analysis>) -> Vec<(String, String)> {
        let mut fields = vec![
            ("token".to_string(), self.config.api_token.clone()),
            ("user".to_string(), self.config.user_key.clone()),
            ("title".to_string(), format::title(analysis)),
            (
                "message".to_string(),
                format::message(posting, analysis, Utc::now()),
            ),
            ("html".to_string(), "1".to_string()),
            (
                "priority".to_string(),
                format::priority(analysis).to_string(),
            ),
        ];
        if let Some(url) = posting.url() {
            fields.push(("url".to_string(), url));
            fields.push(("url_title".to_string(), "View on Upwork".to_string()));
        }
        fields
    }
}

#[async_trait]
impl PostingNotifier for PushoverNotifier {
    fn name(&self) -> &'static str {
        "pushover"
    }

    async fn notify(&self, posting: &Posting, analysis: Option<&Analysis>) -> Result<()> {
        let request = HttpRequest::form(self.endpoint.clone(), self.fields(posting, analysis));
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            warn!(
                posting_id = %posting.id,
                status = response.status,
                body = %response.body,
                "Pushover rejected notification"
            );
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }
        debug!(posting_id = %posting.id, "Pushover notification sent");
        Ok(())
    }
}
