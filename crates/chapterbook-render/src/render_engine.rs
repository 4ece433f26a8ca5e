use chapterbook::{
    ChapterLibrary, Document, Element, IncludeDirective, IncludeSource, Section, SectionChild, Tag,
};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::diagram::classify_preformatted;
use crate::render_inline::render_inline;
use crate::render_ir::{
    plain_text, AdmonitionKind, CodeBlock, DefinitionEntry, HeadingLevel, ListStyle, RenderNode,
    RenderedChapter, RenderedSection, TableCell, TableRow,
};

/// Language reported for code listings that declare none.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Runtime diagnostics from rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderDiagnostic {
    /// An element with an unrecognized name was dropped.
    UnknownTag(String),
    /// An include directive named a file that could not be read.
    IncludeMissing {
        /// Relative include path.
        path: String,
    },
    /// A subtree nested deeper than the configured limit was dropped.
    DepthLimit {
        /// Depth at which rendering stopped.
        depth: usize,
    },
}

type DiagnosticSink = Arc<Mutex<Option<Box<dyn FnMut(RenderDiagnostic) + Send + 'static>>>>;

/// Render-engine options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Route prefix for links to other chapters.
    pub route_prefix: String,
    /// Link suffixes that identify a chapter source file.
    pub chapter_extensions: Vec<String>,
    /// Text marking a `simpara` as a horizontal rule.
    pub hr_marker: String,
    /// Maximum section/block nesting rendered.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            route_prefix: "/chapters".to_string(),
            chapter_extensions: vec![".xml".to_string(), ".adoc".to_string()],
            hr_marker: "asciidoc-hr".to_string(),
            max_depth: 64,
        }
    }
}

impl RenderOptions {
    /// Set the route prefix for internal links.
    pub fn with_route_prefix(mut self, prefix: &str) -> Self {
        self.route_prefix = prefix.to_string();
        self
    }

    /// Set the suffixes that make a link internal.
    pub fn with_chapter_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chapter_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the horizontal-rule marker.
    pub fn with_hr_marker(mut self, marker: &str) -> Self {
        self.hr_marker = marker.to_string();
        self
    }

    /// Set the maximum rendered nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Render engine for document -> render tree conversion.
///
/// Rendering is a pure function of the document and the include source;
/// the engine holds only options and the diagnostics sink.
#[derive(Clone)]
pub struct RenderEngine {
    opts: RenderOptions,
    diagnostic_sink: DiagnosticSink,
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl RenderEngine {
    /// Create a render engine.
    pub fn new(opts: RenderOptions) -> Self {
        Self {
            opts,
            diagnostic_sink: Arc::new(Mutex::new(None)),
        }
    }

    /// Engine options.
    pub fn options(&self) -> &RenderOptions {
        &self.opts
    }

    /// Register or replace the diagnostics sink.
    pub fn set_diagnostic_sink<F>(&mut self, sink: F)
    where
        F: FnMut(RenderDiagnostic) + Send + 'static,
    {
        if let Ok(mut slot) = self.diagnostic_sink.lock() {
            *slot = Some(Box::new(sink));
        }
    }

    fn emit_diagnostic(&self, diagnostic: RenderDiagnostic) {
        if let Ok(mut slot) = self.diagnostic_sink.lock() {
            if let Some(sink) = slot.as_mut() {
                sink(diagnostic);
            }
        }
    }

    /// Load chapter `id` from `library` and render it.
    ///
    /// Never fails: unreadable chapters render as their placeholder document,
    /// and includes are read from the library's code root.
    pub fn render_chapter(&self, library: &ChapterLibrary, id: &str) -> RenderedChapter {
        let document = library.load_chapter(id);
        self.render_document(&document, library)
    }

    /// Render every top-level section of `document`.
    pub fn render_document(
        &self,
        document: &Document,
        includes: &dyn IncludeSource,
    ) -> RenderedChapter {
        let sections: Vec<RenderedSection> = document
            .sections
            .iter()
            .map(|section| RenderedSection {
                id: section.id.clone(),
                nodes: self.render_section(section, 0, includes),
            })
            .collect();
        log::debug!(
            "rendered '{}': {} sections, {} top-level nodes",
            document.title,
            sections.len(),
            sections.iter().map(|s| s.nodes.len()).sum::<usize>()
        );
        RenderedChapter {
            title: document.title.clone(),
            sections,
        }
    }

    /// Render a section at nesting `depth`: its heading, then its children
    /// in source order.
    pub fn render_section(
        &self,
        section: &Section,
        depth: usize,
        includes: &dyn IncludeSource,
    ) -> Vec<RenderNode> {
        if !self.within_depth(depth) {
            return Vec::new();
        }

        let mut nodes = Vec::new();
        if let Some(title) = &section.title {
            let content = render_inline(title, &self.opts);
            if !plain_text(&content).trim().is_empty() {
                nodes.push(RenderNode::Heading {
                    level: HeadingLevel::for_depth(depth),
                    depth,
                    id: section.id.clone(),
                    content,
                });
            }
        }

        for child in &section.children {
            match child {
                SectionChild::Section(nested) => {
                    if !self.within_depth(depth + 1) {
                        continue;
                    }
                    nodes.push(RenderNode::Section {
                        depth: depth + 1,
                        id: nested.id.clone(),
                        children: self.render_section(nested, depth + 1, includes),
                    });
                }
                SectionChild::Block(element) => {
                    if let Some(node) = self.block_at(element, includes, depth + 1) {
                        nodes.push(node);
                    }
                }
            }
        }
        nodes
    }

    /// Render one content block. Returns `None` for elements with no block
    /// output (unknown tags, inline-only or structural tags).
    pub fn render_block(
        &self,
        element: &Element,
        includes: &dyn IncludeSource,
    ) -> Option<RenderNode> {
        self.block_at(element, includes, 0)
    }

    fn within_depth(&self, depth: usize) -> bool {
        if depth > self.opts.max_depth {
            log::debug!("nesting depth {} exceeds limit, subtree dropped", depth);
            self.emit_diagnostic(RenderDiagnostic::DepthLimit { depth });
            return false;
        }
        true
    }

    fn block_at(
        &self,
        el: &Element,
        includes: &dyn IncludeSource,
        depth: usize,
    ) -> Option<RenderNode> {
        if !self.within_depth(depth) {
            return None;
        }
        match &el.tag {
            Tag::SimPara => Some(if el.own_content_contains(&self.opts.hr_marker) {
                RenderNode::Divider
            } else {
                RenderNode::Paragraph {
                    spans: render_inline(&el.children, &self.opts),
                }
            }),
            Tag::ProgramListing { language } => {
                Some(self.code_block(el, language.as_deref(), includes))
            }
            Tag::ItemizedList => Some(RenderNode::UnorderedList {
                items: el
                    .filter_children(|tag| *tag == Tag::ListItem)
                    .map(|item| {
                        item.filter_children(|tag| *tag == Tag::SimPara)
                            .flat_map(|para| render_inline(&para.children, &self.opts))
                            .collect()
                    })
                    .collect(),
            }),
            Tag::OrderedList { numeration } => Some(RenderNode::OrderedList {
                style: ListStyle::from(*numeration),
                items: el
                    .filter_children(|tag| *tag == Tag::ListItem)
                    .map(|item| self.blocks_at(item, includes, depth + 1))
                    .collect(),
            }),
            Tag::VariableList => Some(RenderNode::DefinitionList {
                entries: el
                    .filter_children(|tag| *tag == Tag::VarListEntry)
                    .map(|entry| DefinitionEntry {
                        term: child_text(entry, &Tag::Term).unwrap_or_default(),
                        definition: entry
                            .find_child(|tag| *tag == Tag::ListItem)
                            .map(|item| self.blocks_at(item, includes, depth + 1))
                            .unwrap_or_default(),
                    })
                    .collect(),
            }),
            Tag::BlockQuote => Some(RenderNode::Quote {
                body: el
                    .filter_children(|tag| *tag == Tag::SimPara)
                    .map(|para| render_inline(&para.children, &self.opts))
                    .collect(),
                attribution: child_text(el, &Tag::Attribution).filter(|text| !text.is_empty()),
            }),
            Tag::FormalPara => Some(RenderNode::TitledParagraph {
                label: child_text(el, &Tag::Title).unwrap_or_default(),
                body: el
                    .find_child(|tag| *tag == Tag::Para)
                    .map(|para| self.blocks_at(para, includes, depth + 1))
                    .unwrap_or_default(),
            }),
            Tag::Note => Some(self.admonition(AdmonitionKind::Note, el, includes, depth)),
            Tag::Tip => Some(self.admonition(AdmonitionKind::Tip, el, includes, depth)),
            Tag::Warning => Some(self.admonition(AdmonitionKind::Warning, el, includes, depth)),
            Tag::Caution => Some(self.admonition(AdmonitionKind::Caution, el, includes, depth)),
            Tag::Important => {
                Some(self.admonition(AdmonitionKind::Important, el, includes, depth))
            }
            Tag::InformalTable | Tag::Table => self.table(el),
            Tag::Screen | Tag::LiteralLayout => Some(classify_preformatted(el.text_content())),
            Tag::Sidebar => Some(RenderNode::Callout {
                title: child_text(el, &Tag::Title),
                body: el
                    .child_elements()
                    .filter(|child| child.tag != Tag::Title)
                    .filter_map(|child| self.block_at(child, includes, depth + 1))
                    .collect(),
            }),
            Tag::Unknown(name) => {
                log::trace!("unknown element <{}> dropped", name);
                self.emit_diagnostic(RenderDiagnostic::UnknownTag(name.clone()));
                None
            }
            Tag::Book
            | Tag::Article
            | Tag::Chapter { .. }
            | Tag::Preface { .. }
            | Tag::Section { .. }
            | Tag::Info
            | Tag::Title
            | Tag::Para
            | Tag::Literal
            | Tag::Emphasis { .. }
            | Tag::Link { .. }
            | Tag::ListItem
            | Tag::VarListEntry
            | Tag::Term
            | Tag::Attribution
            | Tag::TGroup
            | Tag::THead
            | Tag::TBody
            | Tag::Row
            | Tag::Entry => {
                log::trace!("<{}> has no block output", el.name());
                None
            }
        }
    }

    /// Child elements of `parent` rendered as blocks.
    fn blocks_at(
        &self,
        parent: &Element,
        includes: &dyn IncludeSource,
        depth: usize,
    ) -> Vec<RenderNode> {
        parent
            .child_elements()
            .filter_map(|child| self.block_at(child, includes, depth))
            .collect()
    }

    fn admonition(
        &self,
        kind: AdmonitionKind,
        el: &Element,
        includes: &dyn IncludeSource,
        depth: usize,
    ) -> RenderNode {
        RenderNode::Admonition {
            severity: kind.severity(),
            kind,
            body: self.blocks_at(el, includes, depth + 1),
        }
    }

    fn code_block(
        &self,
        el: &Element,
        language: Option<&str>,
        includes: &dyn IncludeSource,
    ) -> RenderNode {
        let language = language
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();
        let text = el.text_content();

        let Some(directive) = IncludeDirective::detect(&text) else {
            return RenderNode::CodeBlock(CodeBlock {
                language,
                text,
                source: None,
            });
        };
        match includes.read_include(&directive.relative_path) {
            Ok(contents) => RenderNode::CodeBlock(CodeBlock {
                language,
                text: contents,
                source: Some(directive.relative_path),
            }),
            Err(err) => {
                log::warn!("Include not resolved: {}", err);
                self.emit_diagnostic(RenderDiagnostic::IncludeMissing {
                    path: directive.relative_path.clone(),
                });
                RenderNode::IncludeError {
                    path: directive.relative_path,
                }
            }
        }
    }

    fn table(&self, el: &Element) -> Option<RenderNode> {
        let tgroup = el.find_child(|tag| *tag == Tag::TGroup)?;
        let rows_of = |section: Tag| -> Vec<TableRow> {
            tgroup
                .find_child(|tag| *tag == section)
                .map(|part| {
                    part.filter_children(|tag| *tag == Tag::Row)
                        .map(|row| self.table_row(row))
                        .collect()
                })
                .unwrap_or_default()
        };
        Some(RenderNode::Table {
            header_rows: rows_of(Tag::THead),
            body_rows: rows_of(Tag::TBody),
        })
    }

    fn table_row(&self, row: &Element) -> TableRow {
        row.filter_children(|tag| *tag == Tag::Entry)
            .map(|entry| -> TableCell {
                match entry.find_child(|tag| *tag == Tag::SimPara) {
                    Some(para) => render_inline(&para.children, &self.opts),
                    None => render_inline(&entry.children, &self.opts),
                }
            })
            .collect()
    }
}

/// Trimmed text of the first child with `tag`.
fn child_text(el: &Element, tag: &Tag) -> Option<String> {
    el.find_child(|t| t == tag)
        .map(|child| child.text_content().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_ir::{InlineSpan, Severity};
    use chapterbook::{parse_document, parse_element_tree, NoIncludes};

    fn block(xml: &str) -> Option<RenderNode> {
        let el = parse_element_tree(xml).unwrap();
        RenderEngine::default().render_block(&el, &NoIncludes)
    }

    fn text(s: &str) -> InlineSpan {
        InlineSpan::Text(s.to_string())
    }

    #[test]
    fn simpara_with_hr_marker_is_divider() {
        assert_eq!(block("<simpara><?asciidoc-hr?></simpara>"), Some(RenderNode::Divider));
        assert_eq!(
            block("<simpara>plain</simpara>"),
            Some(RenderNode::Paragraph {
                spans: vec![text("plain")]
            })
        );
    }

    #[test]
    fn programlisting_defaults_to_text_language() {
        match block("<programlisting>echo hi</programlisting>") {
            Some(RenderNode::CodeBlock(code)) => {
                assert_eq!(code.language, "text");
                assert_eq!(code.text, "echo hi");
                assert_eq!(code.source, None);
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn programlisting_keeps_whitespace() {
        let xml = "<programlisting language=\"zig\">fn main() void {\n    return;\n}\n</programlisting>";
        match block(xml) {
            Some(RenderNode::CodeBlock(code)) => {
                assert_eq!(code.language, "zig");
                assert_eq!(code.text, "fn main() void {\n    return;\n}\n");
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn itemized_list_uses_listitem_simparas() {
        let xml = r#"<itemizedlist>
  <listitem><simpara>one</simpara></listitem>
  <listitem><simpara>two <literal>x</literal></simpara></listitem>
  <title>ignored</title>
</itemizedlist>"#;
        assert_eq!(
            block(xml),
            Some(RenderNode::UnorderedList {
                items: vec![
                    vec![text("one")],
                    vec![text("two "), InlineSpan::Code("x".into())],
                ]
            })
        );
    }

    #[test]
    fn ordered_list_items_are_blocks() {
        let xml = r#"<orderedlist numeration="loweralpha">
  <listitem><simpara>a</simpara><programlisting>b</programlisting></listitem>
</orderedlist>"#;
        match block(xml) {
            Some(RenderNode::OrderedList { style, items }) => {
                assert_eq!(style, ListStyle::LowerAlpha);
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].len(), 2);
            }
            other => panic!("expected ordered list, got {:?}", other),
        }
    }

    #[test]
    fn unknown_numeration_is_decimal() {
        match block(r#"<orderedlist numeration="hebrew"><listitem/></orderedlist>"#) {
            Some(RenderNode::OrderedList { style, .. }) => assert_eq!(style, ListStyle::Decimal),
            other => panic!("expected ordered list, got {:?}", other),
        }
    }

    #[test]
    fn variable_list_entries() {
        let xml = r#"<variablelist>
  <varlistentry><term>alloc</term><listitem><simpara>Allocates.</simpara></listitem></varlistentry>
  <varlistentry><term>free</term></varlistentry>
</variablelist>"#;
        assert_eq!(
            block(xml),
            Some(RenderNode::DefinitionList {
                entries: vec![
                    DefinitionEntry {
                        term: "alloc".into(),
                        definition: vec![RenderNode::Paragraph {
                            spans: vec![text("Allocates.")]
                        }],
                    },
                    DefinitionEntry {
                        term: "free".into(),
                        definition: Vec::new(),
                    },
                ]
            })
        );
    }

    #[test]
    fn blockquote_with_attribution() {
        let xml = r#"<blockquote><attribution>Andrew</attribution><simpara>Simple.</simpara></blockquote>"#;
        assert_eq!(
            block(xml),
            Some(RenderNode::Quote {
                body: vec![vec![text("Simple.")]],
                attribution: Some("Andrew".into()),
            })
        );
        assert_eq!(
            block("<blockquote><simpara>q</simpara></blockquote>"),
            Some(RenderNode::Quote {
                body: vec![vec![text("q")]],
                attribution: None,
            })
        );
    }

    #[test]
    fn formalpara_label_and_body() {
        let xml = r#"<formalpara><title>Run</title><para><screen>$ zig run x.zig</screen></para></formalpara>"#;
        assert_eq!(
            block(xml),
            Some(RenderNode::TitledParagraph {
                label: "Run".into(),
                body: vec![RenderNode::Preformatted {
                    text: "$ zig run x.zig".into()
                }],
            })
        );
    }

    #[test]
    fn admonition_severities() {
        for (tag, severity) in [
            ("note", Severity::Info),
            ("tip", Severity::Info),
            ("warning", Severity::Warning),
            ("caution", Severity::Warning),
            ("important", Severity::Error),
        ] {
            let xml = format!("<{tag}><simpara>x</simpara></{tag}>");
            match block(&xml) {
                Some(RenderNode::Admonition {
                    severity: got,
                    body,
                    ..
                }) => {
                    assert_eq!(got, severity, "{}", tag);
                    assert_eq!(body.len(), 1);
                }
                other => panic!("expected admonition for {}, got {:?}", tag, other),
            }
        }
    }

    #[test]
    fn admonition_holds_nested_blocks() {
        let xml = r#"<warning><simpara>a</simpara><itemizedlist><listitem><simpara>b</simpara></listitem></itemizedlist></warning>"#;
        match block(xml) {
            Some(RenderNode::Admonition { kind, body, .. }) => {
                assert_eq!(kind, AdmonitionKind::Warning);
                assert!(matches!(body[1], RenderNode::UnorderedList { .. }));
            }
            other => panic!("expected admonition, got {:?}", other),
        }
    }

    #[test]
    fn table_rows_from_tgroup() {
        let xml = r#"<informaltable><tgroup cols="2">
  <thead><row><entry>Type</entry><entry>Size</entry></row></thead>
  <tbody>
    <row><entry><simpara><literal>u8</literal></simpara></entry><entry>1</entry></row>
  </tbody>
</tgroup></informaltable>"#;
        assert_eq!(
            block(xml),
            Some(RenderNode::Table {
                header_rows: vec![vec![vec![text("Type")], vec![text("Size")]]],
                body_rows: vec![vec![vec![InlineSpan::Code("u8".into())], vec![text("1")]]],
            })
        );
    }

    #[test]
    fn table_without_tgroup_has_no_output() {
        assert_eq!(block("<table><title>t</title></table>"), None);
    }

    #[test]
    fn sidebar_becomes_callout() {
        let xml = r#"<sidebar><title>Aside</title><simpara>body</simpara></sidebar>"#;
        assert_eq!(
            block(xml),
            Some(RenderNode::Callout {
                title: Some("Aside".into()),
                body: vec![RenderNode::Paragraph {
                    spans: vec![text("body")]
                }],
            })
        );
    }

    #[test]
    fn unknown_tag_reports_diagnostic() {
        let mut engine = RenderEngine::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.set_diagnostic_sink(move |d| sink.lock().unwrap().push(d));

        let el = parse_element_tree("<mediaobject/>").unwrap();
        assert_eq!(engine.render_block(&el, &NoIncludes), None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RenderDiagnostic::UnknownTag("mediaobject".into())]
        );
    }

    #[test]
    fn include_failure_reports_diagnostic() {
        let mut engine = RenderEngine::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.set_diagnostic_sink(move |d| sink.lock().unwrap().push(d));

        let el = parse_element_tree(
            "<programlisting>Unresolved directive include::example$chapters-data/code/gone.zig[]</programlisting>",
        )
        .unwrap();
        assert_eq!(
            engine.render_block(&el, &NoIncludes),
            Some(RenderNode::IncludeError {
                path: "gone.zig".into()
            })
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RenderDiagnostic::IncludeMissing {
                path: "gone.zig".into()
            }]
        );
    }

    #[test]
    fn section_headings_by_depth() {
        let doc = parse_document(
            r#"<chapter xml:id="c"><title>Top</title>
  <section xml:id="c-s"><title>Sub</title><simpara>x</simpara></section>
</chapter>"#,
        )
        .unwrap();
        let nodes = RenderEngine::default().render_section(&doc.sections[0], 0, &NoIncludes);
        assert_eq!(
            nodes,
            vec![
                RenderNode::Heading {
                    level: HeadingLevel::Top,
                    depth: 0,
                    id: Some("c".into()),
                    content: vec![text("Top")],
                },
                RenderNode::Section {
                    depth: 1,
                    id: Some("c-s".into()),
                    children: vec![
                        RenderNode::Heading {
                            level: HeadingLevel::Sub,
                            depth: 1,
                            id: Some("c-s".into()),
                            content: vec![text("Sub")],
                        },
                        RenderNode::Paragraph {
                            spans: vec![text("x")]
                        },
                    ],
                },
            ]
        );
    }

    #[test]
    fn untitled_section_has_no_heading() {
        let doc = parse_document("<section><simpara>x</simpara></section>").unwrap();
        let nodes = RenderEngine::default().render_section(&doc.sections[0], 0, &NoIncludes);
        assert_eq!(
            nodes,
            vec![RenderNode::Paragraph {
                spans: vec![text("x")]
            }]
        );
    }

    #[test]
    fn depth_limit_drops_deep_subtrees() {
        let mut engine = RenderEngine::new(RenderOptions::default().with_max_depth(2));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.set_diagnostic_sink(move |d| sink.lock().unwrap().push(d));

        let xml = "<note><note><note><simpara>deep</simpara></note></note></note>";
        let el = parse_element_tree(xml).unwrap();
        let out = engine.render_block(&el, &NoIncludes);
        assert_eq!(
            out,
            Some(RenderNode::Admonition {
                severity: Severity::Info,
                kind: AdmonitionKind::Note,
                body: vec![RenderNode::Admonition {
                    severity: Severity::Info,
                    kind: AdmonitionKind::Note,
                    body: vec![RenderNode::Admonition {
                        severity: Severity::Info,
                        kind: AdmonitionKind::Note,
                        body: Vec::new(),
                    }],
                }],
            })
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RenderDiagnostic::DepthLimit { depth: 3 }]
        );
    }
}
