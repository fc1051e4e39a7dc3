//! OAuth2 token lifecycle.
//!
//! Access tokens are refreshed with the refresh-token grant, either
//! proactively (when the last successful refresh is older than the
//! configured interval) or on demand after the API rejected a token.
//! Refreshes never overlap: the server invalidates the previous refresh
//! token on rotation, so two racing refreshes would persist conflicting
//! pairs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::credentials::CredentialStore;
use crate::port::{HttpRequest, HttpTransport};

/// Upwork OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://www.upwork.com/api/v3/oauth2/token";

/// Default age after which the access token is refreshed proactively.
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3000);

/// Pause between proactive attempts after one failed.
const PROACTIVE_RETRY_COOLDOWN: Duration = Duration::from_secs(60);

/// Token manager settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenConfig {
    pub token_url: String,
    pub refresh_interval: Duration,
    /// Treat the loaded access token as stale so the first use refreshes it.
    pub refresh_on_start: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            refresh_on_start: true,
        }
    }
}

/// Result of a refresh attempt. Refreshing never returns an error; callers
/// decide what a failure means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed { message: String },
}

impl RefreshOutcome {
    #[must_use]
    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed)
    }
}

#[derive(Debug, Default)]
struct RefreshState {
    last_success: Option<Instant>,
    last_failure: Option<Instant>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Issues bearer tokens and refreshes them against the token endpoint.
pub struct TokenManager {
    config: TokenConfig,
    store: Arc<CredentialStore>,
    transport: Arc<dyn HttpTransport>,
    state: Mutex<RefreshState>,
    /// Successful refreshes so far; lets a waiting caller see that the
    /// refresh it queued for already happened.
    generation: AtomicU64,
}

impl TokenManager {
    pub fn new(
        config: TokenConfig,
        store: Arc<CredentialStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let state = RefreshState {
            last_success: (!config.refresh_on_start).then(Instant::now),
            last_failure: None,
        };
        Self {
            config,
            store,
            transport,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Number of successful refreshes performed by this manager.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Return a bearer token, refreshing first when the current one is old.
    ///
    /// A failed proactive refresh is logged and the last known token is
    /// returned; the API decides whether it still works.
    pub async fn get_valid_token(&self) -> String {
        let mut state = self.state.lock().await;
        if self.is_stale(&state) {
            debug!("Access token is due for refresh");
            if let RefreshOutcome::Failed { message } = self.refresh_locked(&mut state).await {
                warn!(error = %message, "Proactive token refresh failed, using current token");
            }
        }
        drop(state);
        self.store.access_token()
    }

    /// Refresh the access token now.
    ///
    /// Callers that queued behind a concurrent refresh which succeeded get
    /// its result instead of spending another refresh token.
    pub async fn force_refresh(&self) -> RefreshOutcome {
        let seen = self.generation.load(Ordering::Acquire);
        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::Acquire) != seen {
            debug!("Token was refreshed while waiting, skipping");
            return RefreshOutcome::Refreshed;
        }
        self.refresh_locked(&mut state).await
    }

    fn is_stale(&self, state: &RefreshState) -> bool {
        if state
            .last_failure
            .is_some_and(|at| at.elapsed() < PROACTIVE_RETRY_COOLDOWN)
        {
            return false;
        }
        match state.last_success {
            Some(at) => at.elapsed() >= self.config.refresh_interval,
            None => true,
        }
    }

    async fn refresh_locked(&self, state: &mut RefreshState) -> RefreshOutcome {
        let outcome = self.request_new_tokens().await;
        match &outcome {
            RefreshOutcome::Refreshed => {
                state.last_success = Some(Instant::now());
                state.last_failure = None;
                self.generation.fetch_add(1, Ordering::AcqRel);
            }
            RefreshOutcome::Failed { message } => {
                state.last_failure = Some(Instant::now());
                warn!(endpoint = %self.config.token_url, error = %message, "Token refresh failed");
            }
        }
        outcome
    }

    async fn request_new_tokens(&self) -> RefreshOutcome {
        let credentials = self.store.snapshot();
        if let Err(e) = credentials.validate() {
            return RefreshOutcome::Failed {
                message: e.to_string(),
            };
        }

        let basic = STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));
        let request = HttpRequest::form(
            self.config.token_url.clone(),
            vec![
                ("grant_type".to_string(), "refresh_token".to_string()),
                ("refresh_token".to_string(), credentials.refresh_token),
                ("client_id".to_string(), credentials.client_id),
            ],
        )
        .header("Authorization", format!("Basic {basic}"))
        .header("Accept", "application/json");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                return RefreshOutcome::Failed {
                    message: format!("token request failed: {e}"),
                }
            }
        };
        if response.status != 200 {
            return RefreshOutcome::Failed {
                message: format!("HTTP {}: {}", response.status, response.body),
            };
        }

        let tokens: TokenResponse = match serde_json::from_str(&response.body) {
            Ok(tokens) => tokens,
            Err(e) => {
                return RefreshOutcome::Failed {
                    message: format!("invalid token response: {e}"),
                }
            }
        };
        if tokens.access_token.trim().is_empty() {
            return RefreshOutcome::Failed {
                message: "token response carried an empty access_token".into(),
            };
        }

        let rotated_refresh = tokens.refresh_token.is_some();
        // A failed durable write degrades restarts only; the new pair is live.
        let _ = self.store.rotate(tokens.access_token, tokens.refresh_token);
        info!(rotated_refresh, "Access token refreshed");
        RefreshOutcome::Refreshed
    }
}
