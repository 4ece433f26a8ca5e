//! Mixed content to inline spans.
//!
//! Text and inline elements are emitted in exactly the order they appear in
//! the source. Elements other than `literal`, `emphasis` and `link`
//! contribute nothing.

use chapterbook::{Element, Node, Tag};

use crate::render_engine::RenderOptions;
use crate::render_ir::InlineSpan;

/// Render an ordered child list into inline spans.
pub fn render_inline(children: &[Node], options: &RenderOptions) -> Vec<InlineSpan> {
    render_inline_at(children, options, 0)
}

fn render_inline_at(children: &[Node], options: &RenderOptions, depth: usize) -> Vec<InlineSpan> {
    if depth > options.max_depth {
        log::debug!("inline nesting deeper than {} dropped", options.max_depth);
        return Vec::new();
    }
    children
        .iter()
        .filter_map(|child| match child {
            Node::Text(text) => Some(InlineSpan::Text(text.clone())),
            Node::Element(el) => render_inline_element(el, options, depth),
            Node::Instruction(_) => None,
        })
        .collect()
}

fn render_inline_element(el: &Element, options: &RenderOptions, depth: usize) -> Option<InlineSpan> {
    match &el.tag {
        Tag::Literal => Some(InlineSpan::Code(el.text_content())),
        Tag::Emphasis { strong } => {
            let content = emphasis_content(el, options, depth);
            Some(if *strong {
                InlineSpan::Bold(content)
            } else {
                InlineSpan::Italic(content)
            })
        }
        Tag::Link { href } => {
            let label = el.text_content();
            link_span(href.as_deref(), label, options)
        }
        _ => {
            log::trace!("inline element <{}> ignored", el.name());
            None
        }
    }
}

/// Nested emphasis or links are rendered recursively; otherwise the direct
/// text is used, then the children, and an empty span as the last resort.
fn emphasis_content(el: &Element, options: &RenderOptions, depth: usize) -> Vec<InlineSpan> {
    let has_nested = el
        .child_elements()
        .any(|child| matches!(child.tag, Tag::Emphasis { .. } | Tag::Link { .. }));
    if has_nested {
        return render_inline_at(&el.children, options, depth + 1);
    }
    let direct = el.direct_text();
    if !direct.is_empty() {
        return vec![InlineSpan::Text(direct)];
    }
    render_inline_at(&el.children, options, depth + 1)
}

/// Build the span for a link with the given target and text.
///
/// The label falls back to the target when blank. A link without a target
/// is plain text.
pub fn link_span(href: Option<&str>, label: String, options: &RenderOptions) -> Option<InlineSpan> {
    let Some(href) = href.map(str::trim).filter(|h| !h.is_empty()) else {
        return (!label.is_empty()).then_some(InlineSpan::Text(label));
    };
    let label = if label.trim().is_empty() {
        href.to_string()
    } else {
        label
    };
    Some(match internal_route(href, options) {
        Some(route) => InlineSpan::InternalLink { route, label },
        None => InlineSpan::ExternalLink {
            href: href.to_string(),
            label,
        },
    })
}

/// In-app route for a link to a chapter source file, if `href` names one.
///
/// ```
/// use chapterbook_render::{internal_route, RenderOptions};
///
/// let options = RenderOptions::default();
/// assert_eq!(internal_route("02__foo.xml", &options).as_deref(), Some("/chapters/02__foo"));
/// assert_eq!(internal_route("https://ziglang.org", &options), None);
/// ```
pub fn internal_route(href: &str, options: &RenderOptions) -> Option<String> {
    let stem = options
        .chapter_extensions
        .iter()
        .find_map(|ext| href.strip_suffix(ext.as_str()))?;
    Some(format!(
        "{}/{}",
        options.route_prefix.trim_end_matches('/'),
        stem.trim_start_matches('/')
    ))
}
