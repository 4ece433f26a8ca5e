//! Diagram detection for preformatted blocks.

use crate::render_ir::RenderNode;

/// Leading keywords of diagram declarations.
pub const DIAGRAM_KEYWORDS: [&str; 9] = [
    "graph ",
    "flowchart ",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
];

/// True when the trimmed text starts with a diagram keyword.
pub fn is_diagram(text: &str) -> bool {
    let trimmed = text.trim();
    DIAGRAM_KEYWORDS
        .iter()
        .any(|keyword| trimmed.starts_with(keyword))
}

/// Classify preformatted text as a diagram or plain preformatted output.
/// The raw text is kept untrimmed in either case.
pub fn classify_preformatted(text: String) -> RenderNode {
    if is_diagram(&text) {
        RenderNode::Diagram { text }
    } else {
        RenderNode::Preformatted { text }
    }
}
