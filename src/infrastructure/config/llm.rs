//! LLM analysis configuration.

use serde::Deserialize;

use crate::adapter::outbound::llm::DEFAULT_MODEL;

/// `[llm]` section. The API key is read from `OPENAI_API_KEY` at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Score postings before notifying.
    #[serde(default)]
    pub enabled: bool,

    /// Model identifier. Defaults to "gpt-4o-mini".
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Defaults to 0.3.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum tokens in the response. Defaults to 1000.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

const fn default_temperature() -> f64 {
    0.3
}

const fn default_max_tokens() -> u32 {
    1000
}
