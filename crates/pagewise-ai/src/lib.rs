//! AI engine for Pagewise.
//!
//! Provides:
//! - an OpenAI-compatible chat-completions client
//! - the fixed summarize → diagram pipeline (and a single-call fallback)
//! - the output classifier that turns model text into displayable HTML
//! - per-thread session management with a FIFO turn gate

pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod session;
pub mod token_tracker;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use openai::{client_factory, OpenAiClient, OpenAiConfig};
pub use pipeline::{PipelineBackend, PipelineError, PipelineRun, Stage};
pub use render::{classify, RenderedOutput};
pub use session::{
    AssistantSettings, ClientFactory, ConversationExport, PageContext, Reply, Session,
    SessionError, SessionManager, SessionStatus, Turn, TurnRole,
};
pub use token_tracker::TokenTracker;

/// One chat-completion round trip against a remote model.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Failures talking to the model endpoint. Never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API request failed: {status} {reason}")]
    Http { status: u16, reason: String },
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("Not configured: {0}")]
    NotConfigured(String),
}
