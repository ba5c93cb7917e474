//! Configuration schema types for Pagewise.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the side panel ships with.

mod model;
mod pipeline;
mod session;
mod system;

pub use model::*;
pub use pipeline::*;
pub use session::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Pagewise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct PagewiseConfig {
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
