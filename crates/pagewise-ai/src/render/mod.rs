//! Output classifier.
//!
//! Decides how a pipeline's raw text is shown in the side panel. Rules are
//! tried in a fixed order and the first match wins:
//!
//! 1. a fenced block tagged `html` is trusted markup
//! 2. any fenced block whose body looks like markup is trusted markup
//! 3. text that already carries document or diagram markers is trusted
//! 4. everything else goes through the escaping markdown renderer
//!
//! Whatever comes out, if it mentions a diagram type it is wrapped in a
//! download affordance instead of being shown inline.

mod detect;
mod diagram;
mod markdown;

pub use diagram::{contains_diagram, DiagramDownload, DIAGRAM_FILENAME};
pub use markdown::render_markdown;

/// Classified, display-ready form of a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedOutput {
    Empty,
    /// Markup the model produced, passed through without escaping.
    Html(String),
    /// Escaped text with markdown formatting applied.
    Markdown(String),
    Diagram(DiagramDownload),
}

impl RenderedOutput {
    /// The HTML string handed to the side panel.
    pub fn to_html(&self) -> String {
        match self {
            RenderedOutput::Empty => String::new(),
            RenderedOutput::Html(html) | RenderedOutput::Markdown(html) => html.clone(),
            RenderedOutput::Diagram(download) => download.affordance.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RenderedOutput::Empty => "empty",
            RenderedOutput::Html(_) => "html",
            RenderedOutput::Markdown(_) => "markdown",
            RenderedOutput::Diagram(_) => "diagram",
        }
    }
}

/// Classify raw model output. Deterministic; never fails.
pub fn classify(text: &str) -> RenderedOutput {
    if text.trim().is_empty() {
        return RenderedOutput::Empty;
    }

    let rendered = if let Some(html) = detect::tagged_html_block(text) {
        RenderedOutput::Html(html)
    } else if let Some(html) = detect::fenced_markup(text) {
        RenderedOutput::Html(html)
    } else if detect::is_raw_markup(text) {
        RenderedOutput::Html(text.to_string())
    } else {
        RenderedOutput::Markdown(render_markdown(text))
    };

    let html = rendered.to_html();
    if contains_diagram(&html) {
        RenderedOutput::Diagram(DiagramDownload::new(&html))
    } else {
        rendered
    }
}
