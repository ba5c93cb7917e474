//! Validation for smaller config sections: session and server.

use crate::schema::PagewiseConfig;

use super::helpers::validate_range;

/// Validate session lifecycle constraints.
pub(crate) fn validate_session(errors: &mut Vec<String>, config: &PagewiseConfig) {
    validate_range(
        errors,
        "session.content_budget",
        config.session.content_budget.into(),
        100,
        100_000,
    );
    validate_range(
        errors,
        "session.sweep_interval_secs",
        config.session.sweep_interval_secs,
        10,
        86_400,
    );
}

/// Validate server constraints.
pub(crate) fn validate_server(errors: &mut Vec<String>, config: &PagewiseConfig) {
    if config.server.port == 0 {
        errors.push("server.port must not be 0".into());
    }
    if config.server.bind_address.trim().is_empty() {
        errors.push("server.bind_address must not be empty".into());
    }
}
