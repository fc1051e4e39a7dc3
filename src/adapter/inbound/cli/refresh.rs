//! Handler for the `refresh` command.

use std::path::Path;

use super::output;
use crate::adapter::outbound::upwork::RefreshOutcome;
use crate::error::{ApiError, Result};
use crate::infrastructure::bootstrap::{build_http, connect};
use crate::infrastructure::config::Config;

/// Force a token refresh and persist the rotated pair.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    config.init_logging();

    let client = connect(&config, build_http(&config))?;
    match client.tokens().force_refresh().await {
        RefreshOutcome::Refreshed => {
            output::success("Access token refreshed");
            output::field("Saved to", config.upwork.env_file.display());
            Ok(())
        }
        RefreshOutcome::Failed { message } => Err(ApiError::Authentication(format!(
            "token refresh failed: {message}"
        ))
        .into()),
    }
}
