use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chapterbook::{parse_document, parse_element_tree, ChapterLibrary, ContentConfig, NoIncludes};
use chapterbook_render::{
    outline, AdmonitionKind, CodeBlock, HeadingLevel, InlineSpan, ListStyle, RenderDiagnostic,
    RenderEngine, RenderNode, Severity,
};
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn render_block(xml: &str) -> Option<RenderNode> {
    let el = parse_element_tree(xml).unwrap();
    RenderEngine::default().render_block(&el, &NoIncludes)
}

#[test]
fn paragraph_with_internal_link() {
    let node = render_block(r#"<simpara>Hello <link href="02__foo.xml">Chapter 2</link></simpara>"#);
    assert_eq!(
        node,
        Some(RenderNode::Paragraph {
            spans: vec![
                InlineSpan::Text("Hello ".into()),
                InlineSpan::InternalLink {
                    route: "/chapters/02__foo".into(),
                    label: "Chapter 2".into(),
                },
            ]
        })
    );
}

#[test]
fn external_link_keeps_target() {
    let node = render_block(
        r#"<simpara><link xl:href="https://ziglang.org/documentation/">docs</link></simpara>"#,
    );
    assert_eq!(
        node,
        Some(RenderNode::Paragraph {
            spans: vec![InlineSpan::ExternalLink {
                href: "https://ziglang.org/documentation/".into(),
                label: "docs".into(),
            }]
        })
    );
}

#[test]
fn wrapped_source_lines_keep_words_apart() {
    let node = render_block(
        "<simpara>Use <literal>alloc</literal>\n<emphasis>then</emphasis>\n<link xl:href=\"https://x.org\">free</link> it.</simpara>",
    );
    let Some(RenderNode::Paragraph { spans }) = node else {
        panic!("expected paragraph");
    };
    assert_eq!(spans.len(), 7);
    assert_eq!(spans[2], InlineSpan::Text("\n".into()));
    assert_eq!(spans[4], InlineSpan::Text("\n".into()));
    let text: String = spans.iter().map(InlineSpan::plain_text).collect();
    assert_eq!(text, "Use alloc\nthen\nfree it.");
}

#[test]
fn upper_roman_ordered_list() {
    let node = render_block(
        r#"<orderedlist numeration="upperroman">
  <listitem><simpara>first</simpara></listitem>
  <listitem><simpara>second</simpara></listitem>
</orderedlist>"#,
    );
    match node {
        Some(RenderNode::OrderedList { style, items }) => {
            assert_eq!(style, ListStyle::UpperRoman);
            assert_eq!(items.len(), 2);
        }
        other => panic!("expected ordered list, got {:?}", other),
    }
}

#[test]
fn note_is_info_admonition() {
    assert_eq!(
        render_block("<note><simpara>Careful</simpara></note>"),
        Some(RenderNode::Admonition {
            severity: Severity::Info,
            kind: AdmonitionKind::Note,
            body: vec![RenderNode::Paragraph {
                spans: vec![InlineSpan::Text("Careful".into())]
            }],
        })
    );
}

#[test]
fn include_directive_is_resolved_from_code_root() {
    let dir = TempDir::new().unwrap();
    let pages = dir.path().join("pages");
    write(&pages, "code/hello.zig", "const std = @import(\"std\");");
    write(
        &pages,
        "01__hello.xml",
        r#"<book><chapter xml:id="hello"><title>Hello</title>
<programlisting language="zig">Unresolved directive in 01__hello.adoc - include::example$chapters-data/code/hello.zig[]</programlisting>
<programlisting language="zig">Unresolved directive in 01__hello.adoc - include::example$chapters-data/code/missing.zig[]</programlisting>
<simpara>After the listings.</simpara>
</chapter></book>"#,
    );

    let library = ChapterLibrary::new(ContentConfig::new(&pages));
    let chapter = RenderEngine::default().render_chapter(&library, "01__hello");
    let nodes = &chapter.sections[0].nodes;
    assert_eq!(
        nodes[1],
        RenderNode::CodeBlock(CodeBlock {
            language: "zig".into(),
            text: "const std = @import(\"std\");".into(),
            source: Some("hello.zig".into()),
        })
    );
    assert_eq!(
        nodes[2],
        RenderNode::IncludeError {
            path: "missing.zig".into()
        }
    );
    assert_eq!(
        nodes[3],
        RenderNode::Paragraph {
            spans: vec![InlineSpan::Text("After the listings.".into())]
        }
    );
}

#[test]
fn missing_chapter_renders_placeholder() {
    let dir = TempDir::new().unwrap();
    let library = ChapterLibrary::new(ContentConfig::new(dir.path()));
    let chapter = RenderEngine::default().render_chapter(&library, "99__missing");

    assert_eq!(chapter.title, "missing");
    assert!(chapter.is_available());
    assert_eq!(chapter.sections.len(), 1);
    let section = &chapter.sections[0];
    assert_eq!(section.id.as_deref(), Some("parse-error"));
    match &section.nodes[..] {
        [RenderNode::Heading { level, content, .. }, RenderNode::Paragraph { spans }] => {
            assert_eq!(*level, HeadingLevel::Top);
            assert!(!content.is_empty());
            assert!(chapterbook_render::plain_text(spans).contains("99__missing.xml"));
        }
        other => panic!("unexpected placeholder output: {:?}", other),
    }
}

#[test]
fn screen_with_graph_is_diagram() {
    assert_eq!(
        render_block("<screen>graph TD; A-->B;</screen>"),
        Some(RenderNode::Diagram {
            text: "graph TD; A-->B;".into()
        })
    );
    assert_eq!(
        render_block("<literallayout>just some output</literallayout>"),
        Some(RenderNode::Preformatted {
            text: "just some output".into()
        })
    );
}

#[test]
fn rendering_is_deterministic() {
    let xml = r#"<book><info><title>T</title></info>
<chapter xml:id="a"><title>A</title>
  <simpara>One <emphasis role="strong">two</emphasis> <link xl:href="03__c.adoc">three</link></simpara>
  <tip><simpara>tip</simpara></tip>
  <section xml:id="a-1"><title>A.1</title><screen>pie title x</screen></section>
</chapter></book>"#;
    let doc = parse_document(xml).unwrap();
    let engine = RenderEngine::default();
    let first = engine.render_document(&doc, &NoIncludes);
    let second = engine.render_document(&parse_document(xml).unwrap(), &NoIncludes);
    assert_eq!(first, second);
}

#[test]
fn unknown_tags_do_not_abort_siblings() {
    let xml = r#"<chapter xml:id="c"><title>C</title>
  <simpara>before</simpara>
  <mediaobject><imageobject/></mediaobject>
  <note><bridgehead>x</bridgehead><simpara>inside</simpara></note>
  <simpara>after</simpara>
</chapter>"#;
    let doc = parse_document(xml).unwrap();
    let mut engine = RenderEngine::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.set_diagnostic_sink(move |d| sink.lock().unwrap().push(d));

    let chapter = engine.render_document(&doc, &NoIncludes);
    let nodes = &chapter.sections[0].nodes;
    assert_eq!(nodes.len(), 4);
    assert!(matches!(nodes[0], RenderNode::Heading { .. }));
    assert!(matches!(&nodes[2], RenderNode::Admonition { body, .. } if body.len() == 1));
    assert_eq!(
        nodes[3],
        RenderNode::Paragraph {
            spans: vec![InlineSpan::Text("after".into())]
        }
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            RenderDiagnostic::UnknownTag("mediaobject".into()),
            RenderDiagnostic::UnknownTag("bridgehead".into()),
        ]
    );
}

#[test]
fn headings_and_content_keep_source_order() {
    let xml = r#"<article>
  <section xml:id="s1"><title>First</title><simpara>p1</simpara></section>
  <section xml:id="s2"><title>Second</title>
    <simpara>p2</simpara>
    <section xml:id="s2-a"><title>Nested</title></section>
    <simpara>p3</simpara>
  </section>
</article>"#;
    let chapter = RenderEngine::default().render_document(&parse_document(xml).unwrap(), &NoIncludes);
    assert_eq!(chapter.sections.len(), 2);
    let second = &chapter.sections[1].nodes;
    assert!(matches!(&second[0], RenderNode::Heading { id: Some(id), .. } if id == "s2"));
    assert!(matches!(&second[1], RenderNode::Paragraph { .. }));
    assert!(matches!(&second[2], RenderNode::Section { depth: 1, .. }));
    assert!(matches!(&second[3], RenderNode::Paragraph { .. }));

    let ids: Vec<String> = outline(&chapter).into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["s1", "s2", "s2-a"]);
}

#[test]
fn empty_book_is_not_available() {
    let doc = parse_document("<book><info><title>Soon</title></info></book>").unwrap();
    let chapter = RenderEngine::default().render_document(&doc, &NoIncludes);
    assert_eq!(chapter.title, "Soon");
    assert!(!chapter.is_available());
}
