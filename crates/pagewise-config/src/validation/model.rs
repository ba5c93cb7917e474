//! Validation for the `[model]` section.

use crate::schema::PagewiseConfig;

use super::helpers::{validate_http_url, validate_range, validate_range_f64};

/// Validate model endpoint constraints. An empty API key is allowed here;
/// it is reported when a session is created instead.
pub(crate) fn validate_model(errors: &mut Vec<String>, config: &PagewiseConfig) {
    validate_http_url(errors, "model.base_url", &config.model.base_url);
    validate_range(
        errors,
        "model.max_tokens",
        config.model.max_tokens.into(),
        1,
        32_768,
    );
    validate_range_f64(
        errors,
        "model.temperature",
        config.model.temperature,
        0.0,
        2.0,
    );
    if config.model.model.trim().is_empty() {
        errors.push("model.model must not be empty".into());
    }
    if config.model.tracing_project.trim().is_empty() {
        errors.push("model.tracing_project must not be empty".into());
    }
}
