//! Pipeline backend selection.

use serde::{Deserialize, Serialize};

/// Which pipeline backend new sessions are wired with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PipelineMode {
    /// Two-stage summarize → diagram chain.
    #[default]
    Graph,
    /// One model call with a general assistant prompt.
    Direct,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    /// Send a test message through the model client before a session is
    /// marked initialized.
    pub probe_on_setup: bool,
}
