//! Pipeline stages and the node that runs one stage.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::prompt::ASSISTANT_SYSTEM_PROMPT;
use crate::{AiClient, AiError, AiResponse, Message};

use super::error::PipelineError;

const SUMMARIZE_INSTRUCTIONS: &str = "You are a summarize agent and have access to the content \
of the page. You summarize the content of the page to highlight the most important \
architecture and design patterns.";

const DIAGRAM_INSTRUCTIONS: &str = "You are a mermaid diagram agent. You take mermaid code and \
render it into a diagram in HTML and only return valid HTML.";

/// One step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Summarize,
    Diagram,
    /// The single call made by the direct backend.
    Respond,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Summarize => "summarize",
            Stage::Diagram => "diagram",
            Stage::Respond => "respond",
        }
    }

    /// Fixed system instructions for this stage.
    pub fn instructions(&self) -> &'static str {
        match self {
            Stage::Summarize => SUMMARIZE_INSTRUCTIONS,
            Stage::Diagram => DIAGRAM_INSTRUCTIONS,
            Stage::Respond => ASSISTANT_SYSTEM_PROMPT,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a single model invocation with the stage's instructions.
#[derive(Clone)]
pub struct StageNode {
    stage: Stage,
    client: Arc<dyn AiClient>,
}

impl StageNode {
    pub fn new(stage: Stage, client: Arc<dyn AiClient>) -> Self {
        Self { stage, client }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the stage on `input`. A blank reply counts as a failure.
    pub async fn run(&self, input: &str) -> Result<AiResponse, PipelineError> {
        let messages = [
            Message::system(self.stage.instructions()),
            Message::user(input),
        ];

        debug!(stage = %self.stage, input_len = input.len(), "running stage");

        let response = self
            .client
            .send_message(&messages)
            .await
            .map_err(|e| PipelineError::new(self.stage, e))?;

        if response.content.trim().is_empty() {
            return Err(PipelineError::new(self.stage, AiError::EmptyResponse));
        }
        Ok(response)
    }
}
