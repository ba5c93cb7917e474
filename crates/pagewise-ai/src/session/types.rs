//! Session data types and errors.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagewise_common::ThreadId;
use pagewise_config::schema::{ModelConfig, PipelineConfig};
use pagewise_config::PagewiseConfig;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;
use crate::render::RenderedOutput;
use crate::{AiClient, AiError};

/// Builds a model client from the current model settings. Injected into
/// the manager so tests can substitute a scripted client.
pub type ClientFactory =
    Arc<dyn Fn(&ModelConfig) -> Result<Arc<dyn AiClient>, AiError> + Send + Sync>;

/// Snapshot of the page a thread was opened on. Never changes once the
/// session holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub content: String,
    pub captured_at: DateTime<Utc>,
}

impl PageContext {
    /// Capture a page, keeping at most `budget` characters of its text.
    pub fn capture(
        url: impl Into<String>,
        title: impl Into<String>,
        content: &str,
        budget: usize,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: truncate_chars(content, budget),
            captured_at: Utc::now(),
        }
    }

    pub(super) fn truncate_content(&mut self, budget: usize) {
        if self.content.chars().count() > budget {
            self.content = truncate_chars(&self.content, budget);
        }
    }
}

fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => f.write_str("user"),
            TurnRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in a thread's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Read-only view of a session, shaped for the side panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub initialized: bool,
    pub thread_id: ThreadId,
    pub message_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
    pub total_tokens: u64,
    /// Name of the pipeline backend the session was built with.
    pub pipeline: &'static str,
}

/// Full conversation dump for one thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationExport {
    pub thread_id: ThreadId,
    pub page_context: PageContext,
    pub history: Vec<Turn>,
    pub exported_at: DateTime<Utc>,
}

/// A successful round trip: the raw model text (what history stores) and
/// its classified rendering (what the panel shows).
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub rendered: RenderedOutput,
}

/// Settings read when a session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    /// Page text budget in characters.
    pub content_budget: usize,
}

impl From<&PagewiseConfig> for AssistantSettings {
    fn from(config: &PagewiseConfig) -> Self {
        Self {
            model: config.model.clone(),
            pipeline: config.pipeline.clone(),
            content_budget: config.session.content_budget as usize,
        }
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self::from(&PagewiseConfig::default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no session for thread '{0}'")]
    NotFound(String),
    #[error("session '{0}' is not initialized")]
    NotInitialized(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("model call failed: {0}")]
    Model(#[from] AiError),
}
