//! Composition root: builds adapters from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::analyzer::LlmAnalyzer;
use crate::adapter::outbound::credential::EnvFileCredentials;
use crate::adapter::outbound::http::{ReqwestTransport, RetryingTransport};
use crate::adapter::outbound::ledger::JsonFileLedger;
use crate::adapter::outbound::llm::OpenAi;
use crate::adapter::outbound::notifier::{PushoverConfig, PushoverNotifier};
use crate::adapter::outbound::upwork::{CredentialStore, TokenManager, UpworkClient};
use crate::application::Poller;
use crate::domain::Credentials;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::{
    CredentialPersistence, HttpTransport, JobSource, LogNotifier, PostingAnalyzer,
    PostingNotifier, SeenLedger,
};

/// Read OAuth2 credentials from the env file that rotations are written
/// to, falling back to the process environment, and check them.
///
/// # Errors
///
/// Returns a configuration error naming the first missing variable, or
/// when the env file cannot be parsed.
pub fn load_credentials(store: &EnvFileCredentials) -> Result<Credentials> {
    let credentials = store.load()?;
    credentials.validate()?;
    Ok(credentials)
}

/// The real network stack with the configured request timeout.
pub fn build_http(config: &Config) -> Arc<dyn HttpTransport> {
    Arc::new(ReqwestTransport::new(config.upwork.timeout()))
}

/// Build the marketplace client.
///
/// Token refreshes go straight through `transport`; GraphQL calls get the
/// configured retry policy on top of it.
pub fn build_client(
    config: &Config,
    credentials: Credentials,
    persistence: Arc<dyn CredentialPersistence>,
    transport: Arc<dyn HttpTransport>,
) -> UpworkClient {
    let store = Arc::new(CredentialStore::new(credentials, persistence));
    let tokens = Arc::new(TokenManager::new(
        config.upwork.token_config(),
        store,
        Arc::clone(&transport),
    ));
    let retrying: Arc<dyn HttpTransport> = Arc::new(RetryingTransport::new(
        transport,
        config.upwork.retry_policy(),
    ));
    UpworkClient::new(config.upwork.graphql_url.clone(), retrying, tokens)
}

/// Build the marketplace client from environment credentials, persisting
/// rotated tokens to the configured env file.
///
/// # Errors
///
/// Returns a configuration error when a credential is missing.
pub fn connect(config: &Config, transport: Arc<dyn HttpTransport>) -> Result<UpworkClient> {
    let store = EnvFileCredentials::new(&config.upwork.env_file);
    let credentials = load_credentials(&store)?;
    info!(env_file = %store.path().display(), "Loaded credentials");
    Ok(build_client(config, credentials, Arc::new(store), transport))
}

/// Open the seen-posting ledger, loading any existing contents.
pub fn build_ledger(config: &Config) -> Arc<JsonFileLedger> {
    Arc::new(JsonFileLedger::open(&config.polling.ledger_path))
}

/// Build the analyzer when LLM scoring is enabled.
///
/// # Errors
///
/// Returns a configuration error if scoring is enabled without an API key.
pub fn build_analyzer(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Result<Option<Arc<dyn PostingAnalyzer>>> {
    if !config.llm.enabled {
        return Ok(None);
    }
    let llm = OpenAi::from_env(
        transport,
        config.llm.model.clone(),
        config.llm.max_tokens,
        config.llm.temperature,
    )?;
    info!(model = %config.llm.model, "LLM analysis enabled");
    let analyzer: Arc<dyn PostingAnalyzer> = Arc::new(LlmAnalyzer::new(Arc::new(llm)));
    Ok(Some(analyzer))
}

/// Build the notifier: Pushover when enabled and configured, else logging.
pub fn build_notifier(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Arc<dyn PostingNotifier> {
    if !config.pushover.enabled {
        return Arc::new(LogNotifier);
    }
    match PushoverConfig::from_env() {
        Ok(pushover) => {
            info!("Pushover notifications enabled");
            Arc::new(PushoverNotifier::new(pushover, transport))
        }
        Err(e) => {
            warn!(error = %e, "Pushover enabled but not configured, logging postings instead");
            Arc::new(LogNotifier)
        }
    }
}

/// Assemble the poller.
///
/// # Errors
///
/// Returns a configuration error for an empty criteria list or bad threshold.
pub fn build_poller(
    config: &Config,
    source: Arc<dyn JobSource>,
    ledger: Arc<dyn SeenLedger>,
    notifier: Arc<dyn PostingNotifier>,
    analyzer: Option<Arc<dyn PostingAnalyzer>>,
) -> Result<Poller> {
    let poller = Poller::new(
        source,
        ledger,
        notifier,
        config.searches.clone(),
        config.polling.poller_config(),
    )?;
    Ok(match analyzer {
        Some(analyzer) => poller.with_analyzer(analyzer),
        None => poller,
    })
}
