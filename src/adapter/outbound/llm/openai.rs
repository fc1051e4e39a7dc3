//! OpenAI LLM client.
//!
//! Provides an implementation of the [`Llm`] trait for the OpenAI
//! Chat Completions API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ConfigError, Error, Result};
use crate::port::{HttpRequest, HttpTransport, Llm};

/// OpenAI Chat Completions API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI API client.
pub struct OpenAi {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    /// Model identifier (e.g., "gpt-4o-mini").
    model: String,
    max_tokens: u32,
    /// Sampling temperature (0.0 to 2.0).
    temperature: f64,
}

impl OpenAi {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    /// Create a client from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the variable is unset or blank.
    pub fn from_env(
        transport: Arc<dyn HttpTransport>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<Self> {
        let api_key = std::env::var(OPENAI_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingField {
                field: OPENAI_API_KEY,
            })?;
        Ok(Self::new(transport, api_key, model, max_tokens, temperature))
    }

    fn body(&self, system: &str, prompt: &str) -> Result<serde_json::Value> {
        let request = Request {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        Ok(serde_json::to_value(request)?)
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Llm for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = HttpRequest::json(API_URL, self.body(system, prompt)?)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let parsed: Response = serde_json::from_str(&response.body)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Parse("completion has no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::transport::ScriptedTransport;

    fn client(transport: Arc<ScriptedTransport>) -> OpenAi {
        OpenAi::new(transport, "sk-test", "gpt-4o-mini", 1000, 0.3)
    }

    #[test]
    fn request_carries_system_and_user_messages() {
        let openai = client(Arc::new(ScriptedTransport::new()));
        let json = openai.body("You evaluate jobs.", "Title: X").unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["temperature"], 0.3);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You evaluate jobs.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Title: X");
    }

    #[tokio::test]
    async fn complete_returns_first_choice_with_bearer_auth() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            "chat/completions",
            200,
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":" SUMMARY: ok \n"}}]}"#,
        ));
        let openai = client(transport.clone());

        let text = openai.complete("sys", "prompt").await.unwrap();

        assert_eq!(text, "SUMMARY: ok");
        let sent = transport.requests_to("chat/completions");
        assert_eq!(sent[0].header_value("authorization"), Some("Bearer sk-test"));
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            "chat/completions",
            200,
            r#"{"choices":[]}"#,
        ));
        assert!(client(transport).complete("s", "p").await.is_err());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            "chat/completions",
            429,
            "rate limited",
        ));
        let err = client(transport).complete("s", "p").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Api(ApiError::Status { status: 429, .. })
        ));
    }
}
