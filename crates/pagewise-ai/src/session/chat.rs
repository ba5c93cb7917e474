//! Message round trips: one pipeline run per user message.

use tracing::{info_span, warn, Instrument};

use crate::prompt::{analyze_prompt, contextual_prompt, ASSISTANT_SYSTEM_PROMPT};
use crate::render::classify;
use crate::Message;

use super::manager::SessionManager;
use super::types::{PageContext, Reply, SessionError, Turn, TurnRole};

impl SessionManager {
    /// Run one user message through the thread's pipeline.
    ///
    /// The user turn is appended before the pipeline runs and stays in
    /// history even if the run fails; the assistant turn is appended only
    /// on success. Turns on the same thread are processed one at a time in
    /// arrival order.
    pub async fn process_message(
        &self,
        thread_id: &str,
        user_message: &str,
    ) -> Result<Reply, SessionError> {
        let slot = self.require_slot(thread_id).await?;
        let _turn = slot.gate.lock().await;

        let (prompt, backend, project) = {
            let mut session = slot.state.write().await;
            if !session.is_initialized() {
                return Err(SessionError::NotInitialized(thread_id.to_string()));
            }
            session.push_turn(Turn::new(TurnRole::User, user_message));
            let prompt = contextual_prompt(session.page(), user_message, session.history());
            (
                prompt,
                session.backend(),
                session.tracing_project().map(String::from),
            )
        };

        let result = match project {
            Some(project) => {
                let span = info_span!(
                    "pipeline_run",
                    thread_id,
                    pipeline = backend.name(),
                    project = %project
                );
                backend.run(&prompt).instrument(span).await
            }
            None => backend.run(&prompt).await,
        };

        let run = match result {
            Ok(run) => run,
            Err(e) => {
                warn!(thread_id, stage = %e.stage, error = %e.source, "Pipeline run failed");
                return Err(e.into());
            }
        };

        let rendered = classify(&run.output);
        let mut session = slot.state.write().await;
        for (stage, usage) in &run.usage {
            session.record_usage(*stage, usage);
        }
        session.push_turn(Turn::new(TurnRole::Assistant, run.output.clone()));
        tracing::debug!(
            thread_id,
            output = rendered.kind(),
            messages = session.message_count(),
            "Turn complete"
        );

        Ok(Reply {
            text: run.output,
            rendered,
        })
    }

    /// Create the thread if needed, then process `message` on it. Returns
    /// the thread id actually used.
    pub async fn chat(
        &self,
        thread_id: Option<&str>,
        page: PageContext,
        message: &str,
    ) -> Result<(String, Reply), SessionError> {
        let status = self.create_or_get(thread_id, page).await?;
        let id = status.thread_id.as_str().to_string();
        let reply = self.process_message(&id, message).await?;
        Ok((id, reply))
    }

    /// One-shot page summary outside of any thread.
    pub async fn analyze_page(&self, page: PageContext) -> Result<String, SessionError> {
        let settings = self.settings().await;
        if !settings.model.has_api_key() {
            return Err(SessionError::Configuration(
                "API key is required but not provided".into(),
            ));
        }
        let client = (self.factory)(&settings.model)
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        let mut page = page;
        page.truncate_content(settings.content_budget);
        let messages = [
            Message::system(ASSISTANT_SYSTEM_PROMPT),
            Message::user(analyze_prompt(&page)),
        ];
        let response = client.send_message(&messages).await?;
        Ok(response.content)
    }
}
