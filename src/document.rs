//! Chapter document model
//!
//! A [`Document`] is the parsed form of one chapter source: a title plus the
//! ordered top-level [`Section`]s (chapters, prefaces and sections found
//! under the `book`/`article` root). Sections own their children; nested
//! sections stay nested and every other child is kept as a content block
//! for the renderer.

use std::path::Path;

use crate::config::ParseLimits;
use crate::error::ChapterError;
use crate::ingest::{parse_element_tree_file, parse_element_tree_with_limits};
use crate::tree::{Element, Node, Tag};

/// Title used when a document declares none.
pub const UNTITLED: &str = "Untitled";

/// Parsed chapter source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Document title.
    pub title: String,
    /// Top-level sections in source order.
    pub sections: Vec<Section>,
}

/// A titled, identifiable grouping of content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Stable identifier for deep links (`xml:id`).
    pub id: Option<String>,
    /// Title as mixed inline content.
    pub title: Option<Vec<Node>>,
    /// Nested sections and content blocks in source order.
    pub children: Vec<SectionChild>,
}

/// Child of a [`Section`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionChild {
    /// Nested section.
    Section(Section),
    /// Content block, rendered by tag.
    Block(Element),
}

impl Document {
    /// Build a document from a parsed root element.
    ///
    /// Children of a `book` or `article` root that are chapters, prefaces or
    /// sections become top-level sections. A root that is itself a section
    /// becomes the only section. Any other root yields no sections.
    pub fn from_root(root: Element) -> Self {
        let title = document_title(&root);
        let sections = if matches!(root.tag, Tag::Book | Tag::Article) {
            root.children
                .into_iter()
                .filter_map(|child| match child {
                    Node::Element(el) if el.tag.is_section() => Some(Section::from_element(el)),
                    _ => None,
                })
                .collect()
        } else if root.tag.is_section() {
            vec![Section::from_element(root)]
        } else {
            Vec::new()
        };
        Self { title, sections }
    }

    /// True when the document has no sections to render.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Section {
    /// Build a section from a chapter/preface/section element.
    ///
    /// The first `title` child (or `info/title` when absent) becomes the
    /// section title and is not repeated among the children.
    pub fn from_element(element: Element) -> Self {
        let id = element.tag.section_id().map(str::to_string);
        let title = element
            .find_child(|tag| *tag == Tag::Title)
            .or_else(|| info_title(&element))
            .map(|title| title.children.clone());

        let children = element
            .children
            .into_iter()
            .filter_map(|child| match child {
                Node::Element(el) if el.tag == Tag::Title => None,
                Node::Element(el) if el.tag.is_section() => {
                    Some(SectionChild::Section(Section::from_element(el)))
                }
                Node::Element(el) => Some(SectionChild::Block(el)),
                Node::Text(_) | Node::Instruction(_) => None,
            })
            .collect();

        Self {
            id,
            title,
            children,
        }
    }

    /// Plain-text title, when present.
    pub fn title_text(&self) -> Option<String> {
        self.title.as_ref().map(|nodes| {
            let mut out = String::new();
            for node in nodes {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Element(el) => out.push_str(&el.text_content()),
                    Node::Instruction(_) => {}
                }
            }
            out
        })
    }
}

/// Parse a chapter source string into a document using default limits.
pub fn parse_document(xml: &str) -> Result<Document, ChapterError> {
    parse_document_with_limits(xml, ParseLimits::default())
}

/// Parse a chapter source string into a document.
pub fn parse_document_with_limits(
    xml: &str,
    limits: ParseLimits,
) -> Result<Document, ChapterError> {
    let root = parse_element_tree_with_limits(xml, limits)?;
    Ok(Document::from_root(root))
}

/// Read and parse a chapter file into a document.
pub fn parse_document_file<P: AsRef<Path>>(
    path: P,
    limits: ParseLimits,
) -> Result<Document, ChapterError> {
    let root = parse_element_tree_file(path, limits)?;
    let document = Document::from_root(root);
    log::debug!(
        "parsed document '{}' with {} top-level sections",
        document.title,
        document.sections.len()
    );
    Ok(document)
}

fn info_title(element: &Element) -> Option<&Element> {
    element
        .find_child(|tag| *tag == Tag::Info)
        .and_then(|info| info.find_child(|tag| *tag == Tag::Title))
}

/// Title fallback chain: direct text of `info/title`, then all text nested
/// inside it, then [`UNTITLED`].
fn document_title(root: &Element) -> String {
    let Some(title) = info_title(root) else {
        return UNTITLED.to_string();
    };
    let direct = title.direct_text();
    if !direct.trim().is_empty() {
        return direct.trim().to_string();
    }
    let nested = title.text_content();
    if !nested.trim().is_empty() {
        return nested.trim().to_string();
    }
    UNTITLED.to_string()
}
