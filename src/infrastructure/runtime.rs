//! Process runtime: wire everything and run the poller.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::bootstrap::{
    build_analyzer, build_http, build_ledger, build_notifier, build_poller, connect,
};
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Run until `shutdown` flips to `true` or a fatal error stops the poller.
///
/// # Errors
///
/// Returns configuration errors found while wiring, or the fatal error
/// that stopped the poll loop.
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        searches = config.searches.len(),
        endpoint = %config.upwork.graphql_url,
        "Starting jobsniper"
    );

    let http = build_http(&config);
    let client = Arc::new(connect(&config, Arc::clone(&http))?);
    let ledger = build_ledger(&config);
    let notifier = build_notifier(&config, Arc::clone(&http));
    let analyzer = build_analyzer(&config, http)?;

    let mut poller = build_poller(&config, client, ledger, notifier, analyzer)?;
    let result = poller.run(shutdown).await;
    info!("jobsniper stopped");
    result
}
