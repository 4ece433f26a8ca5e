//! DocBook XML to element tree
//!
//! Uses quick_xml pull parsing with an explicit element stack, so deeply
//! nested input never recurses on the call stack. Text is kept as explicit
//! child nodes in source order; it is never folded into the parent.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::config::ParseLimits;
use crate::error::ChapterError;
use crate::tree::{Element, Node};

/// Parse an XML string into its root element using default limits.
///
/// # Example
/// ```
/// use chapterbook::ingest::parse_element_tree;
/// use chapterbook::tree::Tag;
///
/// let root = parse_element_tree("<simpara>Hello <literal>std</literal></simpara>").unwrap();
/// assert_eq!(root.tag, Tag::SimPara);
/// assert_eq!(root.children.len(), 2);
/// ```
pub fn parse_element_tree(xml: &str) -> Result<Element, ChapterError> {
    parse_element_tree_with_limits(xml, ParseLimits::default())
}

/// Parse an XML string into its root element.
pub fn parse_element_tree_with_limits(
    xml: &str,
    limits: ParseLimits,
) -> Result<Element, ChapterError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = false;

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                check_depth(stack.len(), limits)?;
                ensure_single_root(&root)?;
                stack.push(start_element(&e, &reader)?);
            }
            Ok(Event::Empty(e)) => {
                check_depth(stack.len(), limits)?;
                ensure_single_root(&root)?;
                let element = start_element(&e, &reader)?;
                close_element(element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                // quick_xml has already verified the end name matches.
                let Some(mut element) = stack.pop() else {
                    return Err(ChapterError::Malformed(
                        "closing tag without matching opening tag".to_string(),
                    ));
                };
                let preserve = element.tag.preserves_whitespace()
                    || element.tag.has_mixed_content()
                    || stack.iter().any(|open| open.tag.preserves_whitespace());
                if !preserve {
                    drop_formatting_whitespace(&mut element.children);
                }
                close_element(element, &mut stack, &mut root);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|e| ChapterError::Malformed(format!("Decode error: {:?}", e)))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|e| ChapterError::Malformed(format!("Decode error: {:?}", e)))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::GeneralRef(e)) => {
                let entity_name = e
                    .decode()
                    .map_err(|e| ChapterError::Malformed(format!("Decode error: {:?}", e)))?;
                let entity_str = format!("&{};", entity_name);
                // Entities outside the XML predefined set are kept verbatim.
                let resolved = unescape(&entity_str)
                    .map(|resolved| resolved.into_owned())
                    .unwrap_or_else(|_| entity_str.clone());
                push_text(&mut stack, &resolved)?;
            }
            Ok(Event::PI(e)) => {
                if let Some(current) = stack.last_mut() {
                    let target = reader
                        .decoder()
                        .decode(e.target())
                        .map_err(|e| ChapterError::Malformed(format!("Decode error: {:?}", e)))?;
                    current
                        .children
                        .push(Node::Instruction(target.trim().to_string()));
                }
            }
            Ok(Event::Comment(_)) | Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ChapterError::Malformed(format!(
            "unclosed element <{}> at end of input",
            open.name()
        )));
    }

    root.ok_or_else(|| ChapterError::Malformed("document has no root element".to_string()))
}

/// Read and parse a chapter file into its root element.
///
/// The file handle is scoped to the read; it is closed before parsing begins.
pub fn parse_element_tree_file<P: AsRef<Path>>(
    path: P,
    limits: ParseLimits,
) -> Result<Element, ChapterError> {
    let path = path.as_ref();
    let xml = read_source(path, limits)?;
    parse_element_tree_with_limits(&xml, limits)
}

/// Read a source file as UTF-8, enforcing the size limit.
pub(crate) fn read_source(path: &Path, limits: ParseLimits) -> Result<String, ChapterError> {
    let metadata = std::fs::metadata(path).map_err(|e| ChapterError::from_io(path, &e))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > limits.max_file_bytes {
        return Err(ChapterError::LimitExceeded {
            kind: "max_file_bytes",
            actual: size,
            limit: limits.max_file_bytes,
        });
    }
    std::fs::read_to_string(path).map_err(|e| ChapterError::from_io(path, &e))
}

/// Reject an element opened below `open` ancestors when that exceeds the
/// nesting limit.
fn check_depth(open: usize, limits: ParseLimits) -> Result<(), ChapterError> {
    if open >= limits.max_depth {
        return Err(ChapterError::LimitExceeded {
            kind: "max_depth",
            actual: open + 1,
            limit: limits.max_depth,
        });
    }
    Ok(())
}

fn ensure_single_root(root: &Option<Element>) -> Result<(), ChapterError> {
    if root.is_some() {
        return Err(ChapterError::Malformed(
            "multiple root elements".to_string(),
        ));
    }
    Ok(())
}

/// Attach a finished element to its parent, or make it the root.
fn close_element(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

/// Append text to the open element, merging with a preceding text node so
/// entity references split by the reader rejoin their surrounding text.
fn push_text(stack: &mut [Element], text: &str) -> Result<(), ChapterError> {
    if text.is_empty() {
        return Ok(());
    }
    let Some(current) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(ChapterError::Malformed(
            "text content outside the root element".to_string(),
        ));
    };
    if let Some(Node::Text(last)) = current.children.last_mut() {
        last.push_str(text);
    } else {
        current.children.push(Node::Text(text.to_string()));
    }
    Ok(())
}

/// Remove whitespace-only text nodes that span a line break from an
/// element-only container; they are source indentation, not content.
/// Mixed-content elements never reach here.
fn drop_formatting_whitespace(children: &mut Vec<Node>) {
    children.retain(|child| match child {
        Node::Text(text) => !(text.trim().is_empty() && text.contains('\n')),
        _ => true,
    });
}

fn start_element(e: &BytesStart, reader: &Reader<&[u8]>) -> Result<Element, ChapterError> {
    let name = decode_name(e.local_name().as_ref(), reader)?;
    let mut attributes = BTreeMap::new();
    for attr in e.attributes().flatten() {
        let Ok(key) = reader.decoder().decode(attr.key.as_ref()) else {
            continue;
        };
        let Ok(raw) = reader.decoder().decode(&attr.value) else {
            continue;
        };
        let value = unescape(&raw)
            .map(|value| value.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        attributes.insert(key.into_owned(), value);
    }
    Ok(Element::new(&name, attributes))
}

/// Decode element name from bytes
fn decode_name(name: &[u8], reader: &Reader<&[u8]>) -> Result<String, ChapterError> {
    reader
        .decoder()
        .decode(name)
        .map_err(|e| ChapterError::Malformed(format!("Decode error: {:?}", e)))
        .map(|s| s.to_string())
}
