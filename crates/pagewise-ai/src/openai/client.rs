//! Chat-completions client struct, request building, and response parsing.

use std::sync::Arc;

use pagewise_config::schema::ModelConfig;

use crate::session::ClientFactory;
use crate::{AiClient, AiError, AiResponse, Message, TokenUsage};

use super::config::OpenAiConfig;

/// Chat-completions API client.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| AiError::NotConfigured(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Build the JSON request body.
    pub(crate) fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }

    /// Parse a 2xx response body: the first choice's message content.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<AiResponse, AiError> {
        let content = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(String::from)
            .ok_or_else(|| {
                AiError::ParseError("response has no choices[0].message.content".into())
            })?;

        let usage = TokenUsage {
            input_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        };

        Ok(AiResponse { content, usage })
    }
}

/// Factory building an [`OpenAiClient`] from the model section of the config.
pub fn client_factory() -> ClientFactory {
    Arc::new(
        |model: &ModelConfig| -> Result<Arc<dyn AiClient>, AiError> {
            let client = OpenAiClient::new(OpenAiConfig::from(model))?;
            Ok(Arc::new(client))
        },
    )
}
