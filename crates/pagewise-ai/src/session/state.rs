//! Per-thread session state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagewise_common::ThreadId;

use crate::pipeline::{PipelineBackend, Stage};
use crate::token_tracker::TokenTracker;
use crate::TokenUsage;

use super::types::{ConversationExport, PageContext, SessionStatus, Turn};

/// One conversation thread: its page snapshot, history and the pipeline
/// backend it was set up with.
pub struct Session {
    thread_id: ThreadId,
    page: PageContext,
    history: Vec<Turn>,
    initialized: bool,
    last_activity: Option<DateTime<Utc>>,
    tracker: TokenTracker,
    backend: Arc<dyn PipelineBackend>,
    /// Project name for run tracing, when tracing was configured at setup.
    tracing_project: Option<String>,
}

impl Session {
    pub(super) fn new(
        thread_id: ThreadId,
        page: PageContext,
        backend: Arc<dyn PipelineBackend>,
        tracing_project: Option<String>,
    ) -> Self {
        Self {
            thread_id,
            page,
            history: Vec::new(),
            initialized: false,
            last_activity: None,
            tracker: TokenTracker::new(),
            backend,
            tracing_project,
        }
    }

    pub(super) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub(super) fn push_turn(&mut self, turn: Turn) {
        self.last_activity = Some(turn.timestamp);
        self.history.push(turn);
    }

    pub(super) fn record_usage(&mut self, stage: Stage, usage: &TokenUsage) {
        self.tracker.record(stage.as_str(), usage);
    }

    /// Drop every turn. Identity, page and initialization survive; with no
    /// turns left there is no last activity either.
    pub(super) fn clear_history(&mut self) {
        self.history.clear();
        self.last_activity = None;
    }

    pub(super) fn backend(&self) -> Arc<dyn PipelineBackend> {
        self.backend.clone()
    }

    pub(super) fn tracing_project(&self) -> Option<&str> {
        self.tracing_project.as_deref()
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }

    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            initialized: self.initialized,
            thread_id: self.thread_id.clone(),
            message_count: self.history.len(),
            last_activity: self.last_activity,
            total_tokens: self.tracker.total_tokens(),
            pipeline: self.backend.name(),
        }
    }

    pub fn export(&self) -> ConversationExport {
        ConversationExport {
            thread_id: self.thread_id.clone(),
            page_context: self.page.clone(),
            history: self.history.clone(),
            exported_at: Utc::now(),
        }
    }
}
