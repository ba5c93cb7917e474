//! Scripted model client for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::pipeline::Stage;
use crate::{AiClient, AiError, AiResponse, Message, Role, TokenUsage};

const STAGES: [Stage; 3] = [Stage::Summarize, Stage::Diagram, Stage::Respond];

/// Answers each call according to which stage's instructions it carries.
///
/// Default replies echo the input: `summary of: {input}` for summarize,
/// `diagram of: {input}` for diagram, `answer to: {input}` for respond.
/// Calls without a system message are treated as probes and answered
/// with `ok`.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    failing: HashSet<Stage>,
    replies: HashMap<Stage, String>,
    fail_probe: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_at(mut self, stage: Stage) -> Self {
        self.failing.insert(stage);
        self
    }

    pub(crate) fn replying_with(mut self, stage: Stage, reply: &str) -> Self {
        self.replies.insert(stage, reply.to_string());
        self
    }

    pub(crate) fn failing_probe(mut self) -> Self {
        self.fail_probe = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message list received so far, in arrival order.
    pub(crate) fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    fn stage_of(messages: &[Message]) -> Option<Stage> {
        let system = messages.iter().find(|m| m.role == Role::System)?;
        STAGES
            .into_iter()
            .find(|stage| stage.instructions() == system.content)
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn send_message(&self, messages: &[Message]) -> Result<AiResponse, AiError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let input = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let content = match Self::stage_of(messages) {
            None if self.fail_probe => {
                return Err(AiError::Http {
                    status: 401,
                    reason: "Unauthorized".into(),
                })
            }
            None => "ok".to_string(),
            Some(stage) if self.failing.contains(&stage) => {
                return Err(AiError::Http {
                    status: 500,
                    reason: format!("{stage} failed"),
                })
            }
            Some(stage) => match self.replies.get(&stage) {
                Some(reply) => reply.clone(),
                None => match stage {
                    Stage::Summarize => format!("summary of: {input}"),
                    Stage::Diagram => format!("diagram of: {input}"),
                    Stage::Respond => format!("answer to: {input}"),
                },
            },
        };

        Ok(AiResponse {
            content,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        })
    }
}
