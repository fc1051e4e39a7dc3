//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file; secrets (OAuth2
//! client credentials, tokens, API keys) come from the environment.
//!
//! # Example
//!
//! ```no_run
//! use jobsniper::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use super::polling::PollingConfig;
use super::pushover::PushoverAppConfig;
use super::upwork::UpworkConfig;
use crate::domain::{SearchCriterion, MAX_SCORE};
use crate::error::{ConfigError, Result};

/// Longest accepted pause between poll cycles (one day).
pub const MAX_INTERVAL_SECS: u64 = 86_400;
/// Longest accepted pause between postings (ten minutes).
pub const MAX_POSTING_DELAY_MS: u64 = 600_000;
/// Longest accepted HTTP request timeout (ten minutes).
pub const MAX_TIMEOUT_SECS: u64 = 600;
/// Longest accepted proactive token refresh interval (one day).
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Marketplace API endpoints, token refresh and retry settings.
    #[serde(default)]
    pub upwork: UpworkConfig,

    /// Poll loop timing, threshold and ledger location.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Search criteria, polled round-robin in file order.
    ///
    /// Defaults to a single `wordpress` search.
    #[serde(default = "default_searches")]
    pub searches: Vec<SearchCriterion>,

    /// Optional LLM scoring.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Push notifications.
    #[serde(default)]
    pub pushover: PushoverAppConfig,
}

fn default_searches() -> Vec<SearchCriterion> {
    vec![SearchCriterion::default()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            upwork: UpworkConfig::default(),
            polling: PollingConfig::default(),
            searches: default_searches(),
            llm: LlmConfig::default(),
            pushover: PushoverAppConfig::default(),
        }
    }
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check ranges and URLs.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        validate_url("graphql_url", &self.upwork.graphql_url)?;
        validate_url("token_url", &self.upwork.token_url)?;

        check_range(
            "refresh_interval_secs",
            self.upwork.refresh_interval_secs,
            1,
            MAX_REFRESH_INTERVAL_SECS,
        )?;
        check_range("timeout_secs", self.upwork.timeout_secs, 1, MAX_TIMEOUT_SECS)?;
        if !self.upwork.backoff_factor.is_finite() || self.upwork.backoff_factor < 0.0 {
            return Err(invalid("backoff_factor", "must be 0 or greater"));
        }
        check_range("interval_secs", self.polling.interval_secs, 1, MAX_INTERVAL_SECS)?;
        check_range(
            "posting_delay_ms",
            self.polling.posting_delay_ms,
            0,
            MAX_POSTING_DELAY_MS,
        )?;
        if self.polling.min_score > MAX_SCORE {
            return Err(invalid("min_score", "must be between 0 and 10"));
        }
        if self.polling.ledger_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "ledger_path",
            }
            .into());
        }

        if self.searches.is_empty() {
            return Err(invalid("searches", "at least one search is required"));
        }
        for search in &self.searches {
            if search.query.trim().is_empty() {
                return Err(invalid("searches.query", "must not be empty"));
            }
            if search.limit == 0 {
                return Err(invalid("searches.limit", "must be greater than 0"));
            }
        }

        if self.llm.enabled && !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("llm.temperature", "must be between 0 and 2"));
        }
        if self.llm.enabled && self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "must be greater than 0"));
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

#[allow(clippy::result_large_err)]
fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be between {min} and {max}")))
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, "must be an http(s) URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::logging::LogFormat;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse_toml("").unwrap();

        assert_eq!(config.searches, vec![SearchCriterion::default()]);
        assert_eq!(config.polling.interval_secs, 300);
        assert_eq!(config.polling.min_score, 7);
        assert_eq!(config.upwork.refresh_interval_secs, 3000);
        assert_eq!(config.upwork.max_retries, 3);
        assert!(config.upwork.refresh_on_start);
        assert!(!config.llm.enabled);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn searches_keep_file_order_and_fill_defaults() {
        let config = Config::parse_toml(
            r#"
            [[searches]]
            query = "rust"
            limit = 20

            [[searches]]
            query = "wordpress"
            hourly_rate_min = 45
            "#,
        )
        .unwrap();

        let queries: Vec<_> = config.searches.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(queries, vec!["rust", "wordpress"]);
        assert_eq!(config.searches[0].hourly_rate_min, 30);
        assert_eq!(config.searches[0].limit, 20);
        assert_eq!(config.searches[1].budget_min, 500);
        assert_eq!(config.searches[1].hourly_rate_min, 45);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for content in [
            "[polling]\ninterval_secs = 0",
            "[polling]\ninterval_secs = 9223372036854775807",
            "[polling]\nposting_delay_ms = 18446744073709551615",
            "[upwork]\ntimeout_secs = 86400",
            "[upwork]\nrefresh_interval_secs = 172800",
            "[polling]\nmin_score = 11",
            "[upwork]\nrefresh_interval_secs = 0",
            "[upwork]\ngraphql_url = \"not a url\"",
            "[upwork]\ntoken_url = \"ftp://example.com/token\"",
            "searches = []",
            "[[searches]]\nquery = \"rust\"\nlimit = 0",
        ] {
            let err = Config::parse_toml(content).unwrap_err();
            assert!(err.is_fatal(), "{content}: {err}");
        }
    }

    #[test]
    fn upper_bounds_are_inclusive() {
        let config = Config::parse_toml(&format!(
            "[polling]\ninterval_secs = {MAX_INTERVAL_SECS}\nposting_delay_ms = {MAX_POSTING_DELAY_MS}\n[upwork]\ntimeout_secs = {MAX_TIMEOUT_SECS}"
        ))
        .unwrap();
        assert_eq!(config.polling.interval_secs, MAX_INTERVAL_SECS);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[polling\ninterval_secs = 1").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn json_logging_format_parses() {
        let config = Config::parse_toml("[logging]\nlevel = \"debug\"\nformat = \"json\"").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "debug");
    }
}
