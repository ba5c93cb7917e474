//! Thread map, session lifecycle and read paths.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagewise_common::ThreadId;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::pipeline::{build_backend, PipelineBackend};

use super::state::Session;
use super::types::{
    AssistantSettings, ClientFactory, ConversationExport, PageContext, SessionError,
    SessionStatus, Turn,
};

/// A session plus the gate that queues its turns. `tokio::sync::Mutex` is
/// fair, so waiting turns run in arrival order.
pub(super) struct SessionSlot {
    pub(super) gate: Mutex<()>,
    pub(super) state: RwLock<Session>,
}

impl SessionSlot {
    fn new(session: Session) -> Self {
        Self {
            gate: Mutex::new(()),
            state: RwLock::new(session),
        }
    }
}

/// Thread-safe session registry. Cloning shares the same map.
#[derive(Clone)]
pub struct SessionManager {
    pub(super) sessions: Arc<RwLock<HashMap<ThreadId, Arc<SessionSlot>>>>,
    pub(super) settings: Arc<RwLock<AssistantSettings>>,
    pub(super) factory: ClientFactory,
}

impl SessionManager {
    pub fn new(settings: AssistantSettings, factory: ClientFactory) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings: Arc::new(RwLock::new(settings)),
            factory,
        }
    }

    /// Return the session for `thread_id`, creating it if needed.
    ///
    /// A missing or empty id gets a freshly generated one. For a known id
    /// the supplied page is ignored and the existing session is returned
    /// unchanged. Nothing is inserted when setup fails.
    pub async fn create_or_get(
        &self,
        thread_id: Option<&str>,
        page: PageContext,
    ) -> Result<SessionStatus, SessionError> {
        let id = match thread_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => ThreadId::from(id),
            None => ThreadId::new(),
        };

        if let Some(slot) = self.slot(&id).await {
            return Ok(slot.state.read().await.status());
        }

        let settings = self.settings().await;
        let backend = self.setup_backend(&settings).await?;
        let tracing_project = settings
            .model
            .tracing_enabled()
            .then(|| settings.model.tracing_project.clone());

        let mut page = page;
        page.truncate_content(settings.content_budget);

        let mut session = Session::new(id.clone(), page, backend, tracing_project);
        session.mark_initialized();

        let slot = {
            let mut map = self.sessions.write().await;
            // Another caller may have created the same thread meanwhile.
            map.entry(id.clone())
                .or_insert_with(|| Arc::new(SessionSlot::new(session)))
                .clone()
        };

        let status = slot.state.read().await.status();
        info!(
            thread_id = %id,
            pipeline = status.pipeline,
            "Session ready"
        );
        Ok(status)
    }

    /// Build the pipeline backend for a new session.
    async fn setup_backend(
        &self,
        settings: &AssistantSettings,
    ) -> Result<Arc<dyn PipelineBackend>, SessionError> {
        if !settings.model.has_api_key() {
            return Err(SessionError::Configuration(
                "API key is required but not provided".into(),
            ));
        }

        let client = (self.factory)(&settings.model)
            .map_err(|e| SessionError::Configuration(e.to_string()))?;
        let backend = build_backend(settings.pipeline.mode, client);

        if settings.pipeline.probe_on_setup {
            backend
                .probe()
                .await
                .map_err(|e| SessionError::Configuration(format!("model probe failed: {e}")))?;
            debug!(pipeline = backend.name(), "Model probe succeeded");
        }

        Ok(backend)
    }

    pub(super) async fn slot(&self, thread_id: &ThreadId) -> Option<Arc<SessionSlot>> {
        self.sessions.read().await.get(thread_id).cloned()
    }

    pub(super) async fn require_slot(
        &self,
        thread_id: &str,
    ) -> Result<Arc<SessionSlot>, SessionError> {
        if thread_id.is_empty() {
            return Err(SessionError::NotFound(String::new()));
        }
        self.slot(&ThreadId::from(thread_id))
            .await
            .ok_or_else(|| SessionError::NotFound(thread_id.to_string()))
    }

    pub async fn status(&self, thread_id: &str) -> Result<SessionStatus, SessionError> {
        let slot = self.require_slot(thread_id).await?;
        let status = slot.state.read().await.status();
        Ok(status)
    }

    pub async fn history(&self, thread_id: &str) -> Result<Vec<Turn>, SessionError> {
        let slot = self.require_slot(thread_id).await?;
        let history = slot.state.read().await.history().to_vec();
        Ok(history)
    }

    pub async fn export(&self, thread_id: &str) -> Result<ConversationExport, SessionError> {
        let slot = self.require_slot(thread_id).await?;
        let export = slot.state.read().await.export();
        Ok(export)
    }

    /// Empty a thread's history. Waits for any in-flight turn on the
    /// thread. Returns false when there is no such thread.
    pub async fn clear_history(&self, thread_id: &str) -> bool {
        let Some(slot) = self.slot(&ThreadId::from(thread_id)).await else {
            return false;
        };
        let _turn = slot.gate.lock().await;
        slot.state.write().await.clear_history();
        info!(thread_id, "History cleared");
        true
    }

    /// Remove sessions idle for longer than `max_age`.
    pub async fn sweep_idle(&self, max_age: std::time::Duration) -> usize {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => self.sweep_idle_at(Utc::now(), max_age).await,
            Err(_) => 0,
        }
    }

    /// Remove every session whose last activity is before `now - max_age`.
    /// Sessions without turns are kept, as is any session another task
    /// holds a handle to (a turn queued or in flight). Returns how many
    /// were removed.
    pub async fn sweep_idle_at(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> usize {
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            return 0;
        };

        let mut map = self.sessions.write().await;
        let before = map.len();
        map.retain(|id, slot| {
            // The map's own reference is the only one for an unused slot.
            if Arc::strong_count(slot) > 1 || slot.gate.try_lock().is_err() {
                return true;
            }
            let idle = match slot.state.try_read() {
                Ok(session) => session.last_activity().is_some_and(|last| last < cutoff),
                Err(_) => false,
            };
            if idle {
                info!(thread_id = %id, "Removing idle session");
            }
            !idle
        });
        before - map.len()
    }

    /// Replace the settings used for sessions created from now on.
    pub async fn reconfigure(&self, settings: AssistantSettings) {
        info!(
            model = %settings.model.model,
            base_url = %settings.model.base_url,
            mode = ?settings.pipeline.mode,
            api_key_loaded = settings.model.has_api_key(),
            "Assistant settings updated"
        );
        *self.settings.write().await = settings;
    }

    pub async fn settings(&self) -> AssistantSettings {
        self.settings.read().await.clone()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Status of every session, ordered by thread id.
    pub async fn statuses(&self) -> Vec<SessionStatus> {
        let slots: Vec<Arc<SessionSlot>> = self.sessions.read().await.values().cloned().collect();
        let mut statuses = Vec::with_capacity(slots.len());
        for slot in slots {
            statuses.push(slot.state.read().await.status());
        }
        statuses.sort_by(|a, b| a.thread_id.cmp(&b.thread_id));
        statuses
    }
}
