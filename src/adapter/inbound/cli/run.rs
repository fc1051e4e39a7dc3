//! Handler for the `run` command.

use std::path::Path;

use tokio::sync::watch;
use tracing::info;

use super::output;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::runtime::run_with_shutdown;

/// Poll until Ctrl-C or SIGTERM.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    config.init_logging();

    output::header();
    output::field("Config", config_path.display());
    output::field("Searches", config.searches.len());
    output::field("Interval", format!("{}s", config.polling.interval_secs));
    output::field("Min score", config.polling.min_score);
    output::field("Ledger", config.polling.ledger_path.display());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    run_with_shutdown(config, shutdown_rx).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for SIGTERM, Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
