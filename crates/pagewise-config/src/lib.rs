//! Pagewise configuration system.
//!
//! Provides TOML-based configuration with validation and environment
//! overrides for credentials. All config sections use sensible defaults so
//! partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagewise_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

// Re-export core types for convenience
pub use schema::{PagewiseConfig, CONFIG_SCHEMA_VERSION};
pub use toml_loader::{apply_env_overrides, default_config_path, load_from_path, load_or_create};
pub use toml_writer::{save_config, save_config_to_path};

use std::path::Path;

use pagewise_common::ConfigError;

/// Convenience function to load config from the platform default path.
///
/// Loads `config.toml` from the OS config directory, creates a default if
/// none exists, fills credentials from the environment and validates the
/// result.
pub fn load_config() -> Result<PagewiseConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(path: &Path) -> Result<PagewiseConfig, ConfigError> {
    let mut config = toml_loader::load_or_create(path)?;
    apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string with secrets masked.
pub fn config_to_json(config: &PagewiseConfig) -> String {
    let mut redacted = config.clone();
    redacted.model.api_key = schema::mask_secret(&config.model.api_key);
    redacted.model.tracing_api_key = config
        .model
        .tracing_api_key
        .as_deref()
        .map(schema::mask_secret);
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
