//! Environment variable overrides applied on top of the file config.

use crate::schema::PagewiseConfig;

/// Fill credentials from the environment.
///
/// `PAGEWISE_API_KEY`, then `OPENAI_API_KEY`, fill an empty `model.api_key`;
/// `PAGEWISE_BASE_URL` replaces `model.base_url`. A key already present in
/// the file wins over the environment.
pub fn apply_env_overrides(config: &mut PagewiseConfig) {
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

pub(crate) fn apply_overrides_from(
    config: &mut PagewiseConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if !config.model.has_api_key() {
        if let Some(key) = ["PAGEWISE_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .filter_map(|name| lookup(name))
            .find(|v| !v.trim().is_empty())
        {
            tracing::debug!("using API key from environment");
            config.model.api_key = key;
        }
    }

    if let Some(url) = lookup("PAGEWISE_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.model.base_url = url;
    }
}
