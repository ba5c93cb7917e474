//! Pipeline failure type.

use crate::AiError;

use super::stage::Stage;

/// A stage failed to produce output. The whole run is discarded; partial
/// results from earlier stages are never returned.
#[derive(Debug, thiserror::Error)]
#[error("pipeline failure at {stage} stage: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: AiError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: AiError) -> Self {
        Self { stage, source }
    }
}
