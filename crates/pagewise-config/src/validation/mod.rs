//! Full configuration validation.
//!
//! Validates numeric ranges and endpoint formats. Each domain has its own
//! submodule; this orchestrator calls them all and collects errors into a
//! single `ConfigError`.

mod helpers;
mod misc;
mod model;


use crate::schema::PagewiseConfig;
use pagewise_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PagewiseConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    model::validate_model(&mut errors, config);
    misc::validate_session(&mut errors, config);
    misc::validate_server(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
