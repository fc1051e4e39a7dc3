//! Push notification configuration.

use serde::Deserialize;

/// `[pushover]` section. Keys come from `PUSHOVER_API_TOKEN` and
/// `PUSHOVER_USER_KEY`; without them postings are only logged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushoverAppConfig {
    #[serde(default)]
    pub enabled: bool,
}
