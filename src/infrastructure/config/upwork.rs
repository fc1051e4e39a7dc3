//! Marketplace API configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::http::RetryPolicy;
use crate::adapter::outbound::upwork::{TokenConfig, DEFAULT_GRAPHQL_URL, DEFAULT_TOKEN_URL};

/// `[upwork]` section.
///
/// Client credentials and tokens are never read from this file; they come
/// from the environment (see `env_file`).
#[derive(Debug, Clone, Deserialize)]
pub struct UpworkConfig {
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Age in seconds after which the access token is refreshed proactively.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Refresh the loaded access token before first use.
    #[serde(default = "default_true")]
    pub refresh_on_start: bool,

    /// Dotenv file that receives rotated tokens.
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Transport retries on 429/5xx and connection failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base in seconds.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpworkConfig {
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            token_url: self.token_url.clone(),
            refresh_interval: Duration::from_secs(self.refresh_interval_secs),
            refresh_on_start: self.refresh_on_start,
        }
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_factor: self.backoff_factor,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpworkConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            token_url: default_token_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_on_start: true,
            env_file: default_env_file(),
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_graphql_url() -> String {
    DEFAULT_GRAPHQL_URL.into()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.into()
}

const fn default_refresh_interval_secs() -> u64 {
    3000
}

const fn default_true() -> bool {
    true
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_backoff_factor() -> f64 {
    1.0
}

const fn default_timeout_secs() -> u64 {
    30
}
