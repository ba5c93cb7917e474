//! Fixed linear stage graph: one entry, one exit, no branches.

use std::sync::Arc;

use crate::{AiClient, TokenUsage};

use super::error::PipelineError;
use super::stage::{Stage, StageNode};

/// Result of a successful run: the terminal node's raw text plus the usage
/// of every stage that ran.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub output: String,
    pub usage: Vec<(Stage, TokenUsage)>,
}

/// Directed chain of stage nodes. Each node's output is the next node's
/// input; the entry node receives the caller's prompt.
#[derive(Clone)]
pub struct PipelineGraph {
    nodes: Vec<StageNode>,
}

impl PipelineGraph {
    /// The summarize → diagram chain. Both nodes are built here, so the
    /// order cannot be swapped by a caller.
    pub fn summarize_then_diagram(client: Arc<dyn AiClient>) -> Self {
        Self {
            nodes: vec![
                StageNode::new(Stage::Summarize, client.clone()),
                StageNode::new(Stage::Diagram, client),
            ],
        }
    }

    /// A chain holding exactly one `stage` node.
    pub fn single(stage: Stage, client: Arc<dyn AiClient>) -> Self {
        Self {
            nodes: vec![StageNode::new(stage, client)],
        }
    }

    /// Stage order from entry to exit.
    pub fn stages(&self) -> Vec<Stage> {
        self.nodes.iter().map(StageNode::stage).collect()
    }

    /// Run every node in order. A node never starts before its predecessor
    /// finished; the first failure ends the run and earlier output is
    /// dropped.
    pub async fn run(&self, input: &str) -> Result<PipelineRun, PipelineError> {
        let mut current = input.to_string();
        let mut usage = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let response = node.run(&current).await?;
            usage.push((node.stage(), response.usage));
            current = response.content;
        }
        Ok(PipelineRun {
            output: current,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    fn graph(client: Arc<ScriptedClient>) -> PipelineGraph {
        PipelineGraph::summarize_then_diagram(client)
    }

    #[test]
    fn stage_order_is_fixed() {
        let g = graph(Arc::new(ScriptedClient::new()));
        assert_eq!(g.stages(), vec![Stage::Summarize, Stage::Diagram]);
    }

    #[test]
    fn single_graph_holds_one_node() {
        let g = PipelineGraph::single(Stage::Respond, Arc::new(ScriptedClient::new()));
        assert_eq!(g.stages(), vec![Stage::Respond]);
    }

    #[tokio::test]
    async fn nodes_run_with_their_stage_instructions_in_order() {
        let client = Arc::new(ScriptedClient::new());
        graph(client.clone()).run("prompt").await.unwrap();
        let calls = client.calls();
        assert_eq!(calls[0][0].content, Stage::Summarize.instructions());
        assert_eq!(calls[1][0].content, Stage::Diagram.instructions());
    }

    #[tokio::test]
    async fn output_of_summarize_feeds_diagram() {
        let client = Arc::new(ScriptedClient::new());
        let run = graph(client.clone()).run("prompt").await.unwrap();
        assert_eq!(run.output, "diagram of: summary of: prompt");
        assert_eq!(run.usage.len(), 2);
        assert_eq!(run.usage[0].0, Stage::Summarize);
        assert_eq!(run.usage[1].0, Stage::Diagram);

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1][1].content, "summary of: prompt");
    }

    #[tokio::test]
    async fn summarize_failure_skips_diagram() {
        let client = Arc::new(ScriptedClient::new().failing_at(Stage::Summarize));
        let err = graph(client.clone()).run("prompt").await.unwrap_err();
        assert_eq!(err.stage, Stage::Summarize);
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn diagram_failure_discards_summary() {
        let client = Arc::new(ScriptedClient::new().failing_at(Stage::Diagram));
        let err = graph(client.clone()).run("prompt").await.unwrap_err();
        assert_eq!(err.stage, Stage::Diagram);
        assert_eq!(client.calls().len(), 2);
    }
}
