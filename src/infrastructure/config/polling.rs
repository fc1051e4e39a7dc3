//! Poll loop configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::application::PollerConfig;

/// `[polling]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Seconds between cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Milliseconds between postings within a cycle.
    #[serde(default = "default_posting_delay_ms")]
    pub posting_delay_ms: u64,

    /// Minimum analysis score (0-10) that triggers a notification.
    #[serde(default = "default_min_score")]
    pub min_score: u8,

    /// Seen-posting ledger file.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
}

impl PollingConfig {
    #[must_use]
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.interval_secs),
            posting_delay: Duration::from_millis(self.posting_delay_ms),
            min_score: self.min_score,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            posting_delay_ms: default_posting_delay_ms(),
            min_score: default_min_score(),
            ledger_path: default_ledger_path(),
        }
    }
}

const fn default_interval_secs() -> u64 {
    300
}

const fn default_posting_delay_ms() -> u64 {
    1000
}

const fn default_min_score() -> u8 {
    7
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/seen_jobs.json")
}
