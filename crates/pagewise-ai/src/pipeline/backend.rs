//! Pipeline backends, chosen once when a session is set up.

use std::sync::Arc;

use async_trait::async_trait;
use pagewise_config::schema::PipelineMode;

use crate::prompt::PROBE_MESSAGE;
use crate::{AiClient, AiError, Message};

use super::error::PipelineError;
use super::graph::{PipelineGraph, PipelineRun};
use super::stage::Stage;

/// Turns a contextual prompt into the final raw model output.
#[async_trait]
pub trait PipelineBackend: Send + Sync {
    /// Short name used in logs and status output.
    fn name(&self) -> &'static str;

    async fn run(&self, prompt: &str) -> Result<PipelineRun, PipelineError>;

    /// Send one test message through the underlying client.
    async fn probe(&self) -> Result<(), AiError>;
}

/// The full summarize → diagram pipeline.
pub struct GraphBackend {
    graph: PipelineGraph,
    client: Arc<dyn AiClient>,
}

impl GraphBackend {
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        let graph = PipelineGraph::summarize_then_diagram(client.clone());
        Self { graph, client }
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }
}

#[async_trait]
impl PipelineBackend for GraphBackend {
    fn name(&self) -> &'static str {
        "graph"
    }

    async fn run(&self, prompt: &str) -> Result<PipelineRun, PipelineError> {
        self.graph.run(prompt).await
    }

    async fn probe(&self) -> Result<(), AiError> {
        probe_client(self.client.as_ref()).await
    }
}

/// Single model call with the general assistant prompt.
pub struct DirectBackend {
    graph: PipelineGraph,
    client: Arc<dyn AiClient>,
}

impl DirectBackend {
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        let graph = PipelineGraph::single(Stage::Respond, client.clone());
        Self { graph, client }
    }
}

#[async_trait]
impl PipelineBackend for DirectBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn run(&self, prompt: &str) -> Result<PipelineRun, PipelineError> {
        self.graph.run(prompt).await
    }

    async fn probe(&self) -> Result<(), AiError> {
        probe_client(self.client.as_ref()).await
    }
}

async fn probe_client(client: &dyn AiClient) -> Result<(), AiError> {
    client
        .send_message(&[Message::user(PROBE_MESSAGE)])
        .await
        .map(|_| ())
}

/// Pick the backend variant for `mode`.
pub fn build_backend(mode: PipelineMode, client: Arc<dyn AiClient>) -> Arc<dyn PipelineBackend> {
    match mode {
        PipelineMode::Graph => Arc::new(GraphBackend::new(client)),
        PipelineMode::Direct => Arc::new(DirectBackend::new(client)),
    }
}
