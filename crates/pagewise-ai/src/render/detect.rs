//! Detection of markup the model meant to be displayed as-is.

use std::sync::LazyLock;

use regex::Regex;

static TAGGED_HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```html\s*(.*?)\s*```").expect("render: static regex pattern must compile")
});

static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)\s*```")
        .expect("render: static regex pattern must compile")
});

/// Substrings that mark a fenced block's body as markup.
const FENCED_MARKERS: [&str; 6] = ["<div", "<script", "<html", "<!DOCTYPE", "<svg", "class="];

/// Lowercased prefixes that mark unfenced text as markup.
const RAW_MARKERS: [&str; 4] = [
    "<div class=\"mermaid-diagram\"",
    "<script",
    "<html",
    "<!doctype",
];

/// Body of the first fenced block tagged `html`, trimmed.
pub(super) fn tagged_html_block(text: &str) -> Option<String> {
    TAGGED_HTML_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Body of the first fenced block, if it contains markup.
pub(super) fn fenced_markup(text: &str) -> Option<String> {
    let body = FENCED_RE.captures(text)?.get(1)?.as_str().trim();
    FENCED_MARKERS
        .iter()
        .any(|marker| body.contains(marker))
        .then(|| body.to_string())
}

pub(super) fn is_raw_markup(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    RAW_MARKERS.iter().any(|marker| lower.contains(marker))
}
