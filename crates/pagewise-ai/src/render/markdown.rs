//! Escaping markdown renderer.
//!
//! Each rule is a pure `&str -> String` function; [`render_markdown`]
//! composes them in a fixed order. Escaping always runs first, so nothing
//! the model wrote can introduce markup of its own.

use std::sync::LazyLock;

use regex::{Captures, Regex};

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new($pattern).expect("render: static regex pattern must compile")
        });
    };
}

static_regex!(AMP_RE, r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?");
static_regex!(H3_RE, r"(?m)^### (.*)$");
static_regex!(H2_RE, r"(?m)^## (.*)$");
static_regex!(H1_RE, r"(?m)^# (.*)$");
static_regex!(BOLD_STAR_RE, r"\*\*(.+?)\*\*");
static_regex!(BOLD_UNDERSCORE_RE, r"\b__(.+?)__\b");
static_regex!(ITALIC_STAR_RE, r"\*([^*\s][^*\n]*?)\*");
static_regex!(ITALIC_UNDERSCORE_RE, r"\b_([^_\s][^_\n]*?)_\b");
static_regex!(FENCED_CODE_RE, r"(?s)```(.*?)```");
static_regex!(INLINE_CODE_RE, r"`([^`]+)`");
static_regex!(LINK_RE, r"\[([^\]]+)\]\(([^)]+)\)");
static_regex!(NUMERIC_ENTITY_RE, r"(?i)&#(?:x([0-9a-f]+)|([0-9]+));?");
static_regex!(NAMED_ENTITY_RE, r"(?i)&(colon|tab|newline);?");
static_regex!(LIST_ITEM_RE, r"^(?:[*-]|\d+\.) (.*)$");
static_regex!(LIST_RUN_RE, r"(?:<li>.*?</li>)+");

/// Link schemes allowed to become anchors.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Render untrusted text as safe HTML.
pub fn render_markdown(text: &str) -> String {
    let html = escape(text);
    let html = headers(&html);
    let html = bold(&html);
    let html = italic(&html);
    let html = code(&html);
    let html = links(&html);
    let html = line_breaks(&html);
    let html = list_items(&html);
    wrap_lists(&html)
}

/// Escape `<`, `>` and any `&` that does not already start an entity.
pub(super) fn escape(text: &str) -> String {
    let amp = AMP_RE.replace_all(text, |caps: &Captures| match caps.get(1) {
        Some(entity) => format!("&{}", entity.as_str()),
        None => "&amp;".to_string(),
    });
    amp.replace('<', "&lt;").replace('>', "&gt;")
}

pub(super) fn headers(html: &str) -> String {
    let html = H3_RE.replace_all(html, "<h3>$1</h3>");
    let html = H2_RE.replace_all(&html, "<h2>$1</h2>");
    H1_RE.replace_all(&html, "<h1>$1</h1>").into_owned()
}

pub(super) fn bold(html: &str) -> String {
    let html = BOLD_STAR_RE.replace_all(html, "<strong>$1</strong>");
    BOLD_UNDERSCORE_RE
        .replace_all(&html, "<strong>$1</strong>")
        .into_owned()
}

/// Single `*` or `_` emphasis. The opening marker must be followed by a
/// non-space, so bullet markers and arithmetic are left alone; `_` only
/// counts at word edges.
pub(super) fn italic(html: &str) -> String {
    let html = ITALIC_STAR_RE.replace_all(html, "<em>$1</em>");
    ITALIC_UNDERSCORE_RE
        .replace_all(&html, "<em>$1</em>")
        .into_owned()
}

pub(super) fn code(html: &str) -> String {
    let html = FENCED_CODE_RE.replace_all(html, "<pre><code>$1</code></pre>");
    INLINE_CODE_RE
        .replace_all(&html, "<code>$1</code>")
        .into_owned()
}

/// `[text](href)` links opening in a new tab. Only `http:`, `https:`,
/// `mailto:` and relative targets become anchors; anything else is reduced
/// to its text.
pub(super) fn links(html: &str) -> String {
    LINK_RE
        .replace_all(html, |caps: &Captures| {
            let text = &caps[1];
            let href = caps[2].trim();
            if !is_safe_href(href) {
                return text.to_string();
            }
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                href.replace('"', "&quot;"),
                text
            )
        })
        .into_owned()
}

/// Check the scheme a browser would see: entities decoded, whitespace and
/// control characters dropped, case folded.
fn is_safe_href(href: &str) -> bool {
    let decoded = NUMERIC_ENTITY_RE.replace_all(href, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let decoded = NAMED_ENTITY_RE.replace_all(&decoded, |caps: &Captures| {
        if caps[1].eq_ignore_ascii_case("colon") {
            ":"
        } else {
            ""
        }
    });
    let normalized: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect();

    let head_end = normalized.find(['/', '?', '#']).unwrap_or(normalized.len());
    let head = &normalized[..head_end];
    match head.find(':') {
        Some(colon) => SAFE_SCHEMES.contains(&&head[..colon]),
        // An undecoded entity could still hide a scheme separator.
        None => !head.contains('&'),
    }
}

pub(super) fn line_breaks(html: &str) -> String {
    html.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Turn `* `, `- ` and `1. ` lines into list items. Breaks between two
/// adjacent items are dropped so the run can be wrapped as one list.
pub(super) fn list_items(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut prev_item = false;
    for (i, segment) in html.split("<br>").enumerate() {
        let item = LIST_ITEM_RE
            .captures(segment)
            .map(|caps| format!("<li>{}</li>", &caps[1]));
        let is_item = item.is_some();
        if i > 0 && !(prev_item && is_item) {
            out.push_str("<br>");
        }
        match item {
            Some(li) => out.push_str(&li),
            None => out.push_str(segment),
        }
        prev_item = is_item;
    }
    out
}

/// Wrap each run of consecutive list items in `<ul>`, unless a list
/// container is already present.
pub(super) fn wrap_lists(html: &str) -> String {
    if html.contains("<ul>") || html.contains("<ol>") {
        return html.to_string();
    }
    LIST_RUN_RE.replace_all(html, "<ul>$0</ul>").into_owned()
}
