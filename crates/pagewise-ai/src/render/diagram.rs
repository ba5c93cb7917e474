//! Diagram detection and the standalone download document.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;

/// Suggested file name for the downloadable document.
pub const DIAGRAM_FILENAME: &str = "mermaid-diagram.html";

const MERMAID_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

static DIAGRAM_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:mermaid|graph|flowchart|sequenceDiagram|classDiagram|stateDiagram|erDiagram|journey|gantt|pie|gitgraph|gitGraph)\b",
    )
    .expect("render: static regex pattern must compile")
});

/// True when `html` names a diagram type as a whole word.
pub fn contains_diagram(html: &str) -> bool {
    DIAGRAM_KEYWORD_RE.is_match(html)
}

/// A self-contained page for a diagram reply plus the inline block that
/// offers it for download.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramDownload {
    /// Full HTML document that loads the diagram script and renders on load.
    pub document: String,
    pub filename: String,
    /// Inline markup shown in place of the reply.
    pub affordance: String,
}

impl DiagramDownload {
    pub fn new(content: &str) -> Self {
        let document = standalone_document(content);
        let href = format!("data:text/html;base64,{}", STANDARD.encode(&document));
        let affordance = format!(
            r#"<div class="diagram-download" style="border: 1px solid #ddd; border-radius: 8px; padding: 15px; margin: 10px 0; background: #f9f9f9; text-align: center;">
  <p style="margin: 0 0 10px 0; color: #666;">This content contains Mermaid diagrams</p>
  <a href="{href}" download="{DIAGRAM_FILENAME}" style="display: inline-block; padding: 10px 20px; background: #007bff; color: white; text-decoration: none; border-radius: 6px; font-weight: bold;">&#128190; Download HTML</a>
</div>"#
        );
        Self {
            document,
            filename: DIAGRAM_FILENAME.to_string(),
            affordance,
        }
    }
}

fn standalone_document(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mermaid Diagram</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }}
        .container {{ max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        .mermaid-diagram {{ margin: 20px 0; padding: 20px; border: 1px solid #ddd; border-radius: 8px; background: #fafafa; }}
        .mermaid-code pre {{ background: #f8f8f8; padding: 15px; border-radius: 4px; overflow-x: auto; border: 1px solid #e0e0e0; }}
        .mermaid-container {{ text-align: center; }}
        .mermaid-error {{ color: #d32f2f; background: #ffebee; padding: 10px; border-radius: 4px; border: 1px solid #ffcdd2; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Mermaid Diagram</h1>
        {content}
    </div>
    <script src="{MERMAID_SCRIPT_URL}"></script>
    <script>
        mermaid.initialize({{
            startOnLoad: true,
            theme: 'default',
            themeVariables: {{
                primaryColor: '#007bff',
                primaryTextColor: '#333',
                primaryBorderColor: '#007bff',
                lineColor: '#333',
                secondaryColor: '#f8f9fa',
                tertiaryColor: '#fff'
            }}
        }});
    </script>
</body>
</html>"#
    )
}
