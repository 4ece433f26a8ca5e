use chapterbook::Numeration;

/// `target` attribute for external links.
pub const EXTERNAL_LINK_TARGET: &str = "_blank";

/// `rel` attribute for external links.
pub const EXTERNAL_LINK_REL: &str = "noopener noreferrer";

/// A rendered chapter: title plus one node list per top-level section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderedChapter {
    /// Document title.
    pub title: String,
    /// Top-level sections in source order.
    pub sections: Vec<RenderedSection>,
}

impl RenderedChapter {
    /// False when the chapter has no sections to show.
    pub fn is_available(&self) -> bool {
        !self.sections.is_empty()
    }
}

/// Output of one top-level section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderedSection {
    /// Section id, when present.
    pub id: Option<String>,
    /// Heading and content nodes in source order.
    pub nodes: Vec<RenderNode>,
}

/// Heading semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HeadingLevel {
    /// Title of a top-level section.
    Top,
    /// Title of a nested section.
    Sub,
}

impl HeadingLevel {
    /// Level for a section at `depth`.
    pub fn for_depth(depth: usize) -> Self {
        if depth == 0 {
            Self::Top
        } else {
            Self::Sub
        }
    }
}

/// Marker style of an ordered list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ListStyle {
    /// 1, 2, 3
    #[default]
    Decimal,
    /// a, b, c
    LowerAlpha,
    /// A, B, C
    UpperAlpha,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
}

impl From<Numeration> for ListStyle {
    fn from(numeration: Numeration) -> Self {
        match numeration {
            Numeration::Arabic => Self::Decimal,
            Numeration::LowerAlpha => Self::LowerAlpha,
            Numeration::UpperAlpha => Self::UpperAlpha,
            Numeration::LowerRoman => Self::LowerRoman,
            Numeration::UpperRoman => Self::UpperRoman,
        }
    }
}

/// Admonition severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    /// `note`, `tip`
    Info,
    /// `warning`, `caution`
    Warning,
    /// `important`
    Error,
}

/// Source element of an admonition, for icon selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdmonitionKind {
    /// `<note>`
    Note,
    /// `<tip>`
    Tip,
    /// `<warning>`
    Warning,
    /// `<caution>`
    Caution,
    /// `<important>`
    Important,
}

impl AdmonitionKind {
    /// Severity shown for this kind.
    pub fn severity(self) -> Severity {
        match self {
            Self::Note | Self::Tip => Severity::Info,
            Self::Warning | Self::Caution => Severity::Warning,
            Self::Important => Severity::Error,
        }
    }
}

/// Inline output span.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "content", rename_all = "snake_case")
)]
pub enum InlineSpan {
    /// Literal text.
    Text(String),
    /// Inline code.
    Code(String),
    /// Strong emphasis.
    Bold(Vec<InlineSpan>),
    /// Emphasis.
    Italic(Vec<InlineSpan>),
    /// Link to another chapter, as an in-app route.
    InternalLink {
        /// Route such as `/chapters/02__foo`.
        route: String,
        /// Link text.
        label: String,
    },
    /// Link opened in a new browsing context
    /// (see [`EXTERNAL_LINK_TARGET`], [`EXTERNAL_LINK_REL`]).
    ExternalLink {
        /// Unchanged link target.
        href: String,
        /// Link text.
        label: String,
    },
}

impl InlineSpan {
    /// Text of this span and its children, without markup.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(text) | Self::Code(text) => text.clone(),
            Self::Bold(children) | Self::Italic(children) => plain_text(children),
            Self::InternalLink { label, .. } | Self::ExternalLink { label, .. } => label.clone(),
        }
    }
}

/// Concatenated plain text of `spans`.
pub fn plain_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::plain_text).collect()
}

/// Code listing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CodeBlock {
    /// Declared language, `text` when absent.
    pub language: String,
    /// Code text.
    pub text: String,
    /// Include path the text was loaded from, if any.
    pub source: Option<String>,
}

impl CodeBlock {
    /// Human-readable name for the block's language.
    pub fn language_label(&self) -> String {
        let lang = self.language.trim();
        match lang.to_ascii_lowercase().as_str() {
            "" => "Code".to_string(),
            "zig" => "Zig".to_string(),
            "sh" | "bash" | "shell" | "zsh" => "Shell".to_string(),
            "json" => "JSON".to_string(),
            "toml" => "TOML".to_string(),
            "yaml" | "yml" => "YAML".to_string(),
            "javascript" => "JavaScript".to_string(),
            "typescript" => "TypeScript".to_string(),
            _ => capitalize(lang),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One term/definition pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DefinitionEntry {
    /// Term text.
    pub term: String,
    /// Definition blocks.
    pub definition: Vec<RenderNode>,
}

/// Table cell content.
pub type TableCell = Vec<InlineSpan>;

/// Table row.
pub type TableRow = Vec<TableCell>;

/// Block output node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RenderNode {
    /// Section title.
    Heading {
        /// Top-level or nested.
        level: HeadingLevel,
        /// Section nesting depth (0 for top level).
        depth: usize,
        /// Deep-link anchor.
        id: Option<String>,
        /// Title spans.
        content: Vec<InlineSpan>,
    },
    /// Paragraph of inline spans.
    Paragraph {
        /// Paragraph content.
        spans: Vec<InlineSpan>,
    },
    /// Horizontal rule.
    Divider,
    /// Code listing.
    CodeBlock(CodeBlock),
    /// Notice replacing a code listing whose include could not be read.
    IncludeError {
        /// Missing path.
        path: String,
    },
    /// Bulleted list; each item is a run of inline spans.
    UnorderedList {
        /// Items.
        items: Vec<Vec<InlineSpan>>,
    },
    /// Numbered list; each item is a block sequence.
    OrderedList {
        /// Marker style.
        style: ListStyle,
        /// Items.
        items: Vec<Vec<RenderNode>>,
    },
    /// Terms and definitions.
    DefinitionList {
        /// Entries.
        entries: Vec<DefinitionEntry>,
    },
    /// Block quotation.
    Quote {
        /// Quoted paragraphs.
        body: Vec<Vec<InlineSpan>>,
        /// Footer text.
        attribution: Option<String>,
    },
    /// Paragraph with a short label such as "Run" or "Output".
    TitledParagraph {
        /// Label text.
        label: String,
        /// Body blocks.
        body: Vec<RenderNode>,
    },
    /// Note/tip/warning/caution/important.
    Admonition {
        /// Severity.
        severity: Severity,
        /// Source element.
        kind: AdmonitionKind,
        /// Body blocks.
        body: Vec<RenderNode>,
    },
    /// Table.
    Table {
        /// Rows from `thead`.
        header_rows: Vec<TableRow>,
        /// Rows from `tbody`.
        body_rows: Vec<TableRow>,
    },
    /// Preformatted text.
    Preformatted {
        /// Raw text.
        text: String,
    },
    /// Diagram source for external visualization.
    Diagram {
        /// Raw diagram text.
        text: String,
    },
    /// Boxed aside.
    Callout {
        /// Title text.
        title: Option<String>,
        /// Body blocks.
        body: Vec<RenderNode>,
    },
    /// Nested section output.
    Section {
        /// Section nesting depth.
        depth: usize,
        /// Section id.
        id: Option<String>,
        /// Heading and content nodes.
        children: Vec<RenderNode>,
    },
}
