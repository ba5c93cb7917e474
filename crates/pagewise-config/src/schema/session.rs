//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum page text kept in a snapshot, in characters (100-100000).
    pub content_budget: u32,
    /// Sessions idle longer than this are removed by the sweeper.
    pub max_idle_secs: u64,
    /// How often the sweeper runs (10-86400).
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            content_budget: 5000,
            max_idle_secs: 24 * 60 * 60,
            sweep_interval_secs: 300,
        }
    }
}
