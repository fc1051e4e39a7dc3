//! Handler for the `check` command.

use std::path::Path;

use super::output;
use crate::adapter::outbound::llm::OPENAI_API_KEY;
use crate::adapter::outbound::notifier::PushoverConfig;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_http, connect};
use crate::infrastructure::config::Config;

/// Validate configuration and credentials, then make one authenticated call.
pub async fn execute(config_path: &Path) -> Result<()> {
    output::header();

    output::section("Configuration");
    let config = Config::load(config_path)?;
    config.init_logging();
    output::field("Config", config_path.display());
    output::success("Configuration file is valid");
    output::field("Endpoint", &config.upwork.graphql_url);
    output::field("Searches", config.searches.len());

    output::section("Collaborators");
    report_llm(&config);
    report_pushover(&config);

    output::section("Marketplace API");
    let client = connect(&config, build_http(&config))?;
    output::success("OAuth2 credentials present");
    let organization = client.organization().await?;
    output::success("Authenticated request succeeded");
    output::field("Organization", organization.name);
    output::field("ID", organization.id);

    Ok(())
}

fn report_llm(config: &Config) {
    if !config.llm.enabled {
        output::field("LLM", "disabled");
        return;
    }
    let key_present = std::env::var(OPENAI_API_KEY).is_ok_and(|k| !k.trim().is_empty());
    if key_present {
        output::success(&format!("LLM scoring configured ({})", config.llm.model));
    } else {
        output::warning(&format!("LLM enabled but {OPENAI_API_KEY} is not set"));
    }
}

fn report_pushover(config: &Config) {
    if !config.pushover.enabled {
        output::field("Pushover", "disabled");
        return;
    }
    match PushoverConfig::from_env() {
        Ok(_) => output::success("Pushover notifications configured"),
        Err(e) => output::warning(&format!("Pushover enabled but {e}, postings will be logged")),
    }
}
