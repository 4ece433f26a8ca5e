//! Chapter outline built from rendered headings.

use crate::render_ir::{plain_text, HeadingLevel, RenderNode, RenderedChapter};

/// One heading of a chapter outline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutlineEntry {
    /// Heading anchor.
    pub id: String,
    /// Heading text.
    pub title: String,
    /// Top-level or nested heading.
    pub level: HeadingLevel,
    /// Section nesting depth.
    pub depth: usize,
}

/// Headings with a non-empty id, in document order.
pub fn outline(chapter: &RenderedChapter) -> Vec<OutlineEntry> {
    let mut result = Vec::new();
    for section in &chapter.sections {
        collect_headings(&section.nodes, &mut result);
    }
    result
}

fn collect_headings(nodes: &[RenderNode], result: &mut Vec<OutlineEntry>) {
    for node in nodes {
        match node {
            RenderNode::Heading {
                level,
                depth,
                id: Some(id),
                content,
            } if !id.is_empty() => result.push(OutlineEntry {
                id: id.clone(),
                title: plain_text(content).trim().to_string(),
                level: *level,
                depth: *depth,
            }),
            RenderNode::Section { children, .. } => collect_headings(children, result),
            _ => {}
        }
    }
}
