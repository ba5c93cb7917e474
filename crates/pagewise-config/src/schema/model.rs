//! Model endpoint and credential configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default hosted chat-completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default project name attached to traced pipeline runs.
pub const DEFAULT_TRACING_PROJECT: &str = "browser-assistant";

/// Credentials and request parameters for the chat-completions endpoint.
///
/// Persisted under `[model]`. Values here are read when a session is
/// created; editing them does not touch sessions that already exist.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Valid range: 1-32768.
    pub max_tokens: u32,
    /// Valid range: 0.0-2.0.
    pub temperature: f64,
    pub tracing_api_key: Option<String>,
    pub tracing_project: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 1000,
            temperature: 0.7,
            tracing_api_key: None,
            tracing_project: DEFAULT_TRACING_PROJECT.into(),
        }
    }
}

impl ModelConfig {
    /// True when an API key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// True when run tracing should be attached to pipeline executions.
    pub fn tracing_enabled(&self) -> bool {
        self.tracing_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "missing".into();
    }
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("***{tail}")
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field(
                "tracing_api_key",
                &self.tracing_api_key.as_deref().map(mask_secret),
            )
            .field("tracing_project", &self.tracing_project)
            .finish()
    }
}
