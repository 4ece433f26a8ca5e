//! Ordered element tree for DocBook chapter sources
//!
//! Parsing produces a single-owner tree of [`Element`]s whose children are
//! kept in source order, text included. Mixed content such as
//! `see <link>here</link> for details` stays interleaved exactly as authored.
//!
//! Tag names are classified once at parse time into [`Tag`], which carries
//! the few attributes the renderer needs. The raw attribute map is kept on
//! every element so unknown tags can still be traversed.

use std::collections::BTreeMap;

/// Enumeration scheme of an ordered list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Numeration {
    /// 1, 2, 3 (default)
    #[default]
    Arabic,
    /// a, b, c
    LowerAlpha,
    /// A, B, C
    UpperAlpha,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
}

impl Numeration {
    /// Parse a `numeration` attribute value. Anything outside the known set
    /// falls back to [`Numeration::Arabic`].
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("loweralpha") => Numeration::LowerAlpha,
            Some("upperalpha") => Numeration::UpperAlpha,
            Some("lowerroman") => Numeration::LowerRoman,
            Some("upperroman") => Numeration::UpperRoman,
            _ => Numeration::Arabic,
        }
    }
}

/// Classified element name with the attributes each kind consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    /// `<book>` root
    Book,
    /// `<article>` root
    Article,
    /// `<chapter>`
    Chapter {
        /// `xml:id`
        id: Option<String>,
    },
    /// `<preface>`
    Preface {
        /// `xml:id`
        id: Option<String>,
    },
    /// `<section>`
    Section {
        /// `xml:id`
        id: Option<String>,
    },
    /// `<info>`
    Info,
    /// `<title>`
    Title,
    /// `<simpara>`
    SimPara,
    /// `<para>`
    Para,
    /// `<literal>`
    Literal,
    /// `<emphasis>`
    Emphasis {
        /// `role="strong"`
        strong: bool,
    },
    /// `<link>`
    Link {
        /// `xl:href`, falling back to `href`
        href: Option<String>,
    },
    /// `<programlisting>`
    ProgramListing {
        /// `language`
        language: Option<String>,
    },
    /// `<itemizedlist>`
    ItemizedList,
    /// `<orderedlist>`
    OrderedList {
        /// `numeration`
        numeration: Numeration,
    },
    /// `<listitem>`
    ListItem,
    /// `<variablelist>`
    VariableList,
    /// `<varlistentry>`
    VarListEntry,
    /// `<term>`
    Term,
    /// `<blockquote>`
    BlockQuote,
    /// `<attribution>`
    Attribution,
    /// `<formalpara>`
    FormalPara,
    /// `<note>`
    Note,
    /// `<warning>`
    Warning,
    /// `<tip>`
    Tip,
    /// `<caution>`
    Caution,
    /// `<important>`
    Important,
    /// `<informaltable>`
    InformalTable,
    /// `<table>`
    Table,
    /// `<tgroup>`
    TGroup,
    /// `<thead>`
    THead,
    /// `<tbody>`
    TBody,
    /// `<row>`
    Row,
    /// `<entry>`
    Entry,
    /// `<screen>`
    Screen,
    /// `<literallayout>`
    LiteralLayout,
    /// `<sidebar>`
    Sidebar,
    /// Any other element name, preserved for traversal but never rendered.
    Unknown(String),
}

impl Tag {
    /// Classify a local element name using its attributes.
    pub fn classify(name: &str, attributes: &BTreeMap<String, String>) -> Self {
        let attr = |key: &str| attributes.get(key).cloned();
        match name {
            "book" => Tag::Book,
            "article" => Tag::Article,
            "chapter" => Tag::Chapter { id: attr("xml:id") },
            "preface" => Tag::Preface { id: attr("xml:id") },
            "section" => Tag::Section { id: attr("xml:id") },
            "info" => Tag::Info,
            "title" => Tag::Title,
            "simpara" => Tag::SimPara,
            "para" => Tag::Para,
            "literal" => Tag::Literal,
            "emphasis" => Tag::Emphasis {
                strong: attributes.get("role").map(String::as_str) == Some("strong"),
            },
            "link" => Tag::Link {
                href: attr("xl:href")
                    .or_else(|| attr("xlink:href"))
                    .or_else(|| attr("href")),
            },
            "programlisting" => Tag::ProgramListing {
                language: attr("language"),
            },
            "itemizedlist" => Tag::ItemizedList,
            "orderedlist" => Tag::OrderedList {
                numeration: Numeration::from_attr(
                    attributes.get("numeration").map(String::as_str),
                ),
            },
            "listitem" => Tag::ListItem,
            "variablelist" => Tag::VariableList,
            "varlistentry" => Tag::VarListEntry,
            "term" => Tag::Term,
            "blockquote" => Tag::BlockQuote,
            "attribution" => Tag::Attribution,
            "formalpara" => Tag::FormalPara,
            "note" => Tag::Note,
            "warning" => Tag::Warning,
            "tip" => Tag::Tip,
            "caution" => Tag::Caution,
            "important" => Tag::Important,
            "informaltable" => Tag::InformalTable,
            "table" => Tag::Table,
            "tgroup" => Tag::TGroup,
            "thead" => Tag::THead,
            "tbody" => Tag::TBody,
            "row" => Tag::Row,
            "entry" => Tag::Entry,
            "screen" => Tag::Screen,
            "literallayout" => Tag::LiteralLayout,
            "sidebar" => Tag::Sidebar,
            other => Tag::Unknown(other.to_string()),
        }
    }

    /// Element name as it appears in markup.
    pub fn name(&self) -> &str {
        match self {
            Tag::Book => "book",
            Tag::Article => "article",
            Tag::Chapter { .. } => "chapter",
            Tag::Preface { .. } => "preface",
            Tag::Section { .. } => "section",
            Tag::Info => "info",
            Tag::Title => "title",
            Tag::SimPara => "simpara",
            Tag::Para => "para",
            Tag::Literal => "literal",
            Tag::Emphasis { .. } => "emphasis",
            Tag::Link { .. } => "link",
            Tag::ProgramListing { .. } => "programlisting",
            Tag::ItemizedList => "itemizedlist",
            Tag::OrderedList { .. } => "orderedlist",
            Tag::ListItem => "listitem",
            Tag::VariableList => "variablelist",
            Tag::VarListEntry => "varlistentry",
            Tag::Term => "term",
            Tag::BlockQuote => "blockquote",
            Tag::Attribution => "attribution",
            Tag::FormalPara => "formalpara",
            Tag::Note => "note",
            Tag::Warning => "warning",
            Tag::Tip => "tip",
            Tag::Caution => "caution",
            Tag::Important => "important",
            Tag::InformalTable => "informaltable",
            Tag::Table => "table",
            Tag::TGroup => "tgroup",
            Tag::THead => "thead",
            Tag::TBody => "tbody",
            Tag::Row => "row",
            Tag::Entry => "entry",
            Tag::Screen => "screen",
            Tag::LiteralLayout => "literallayout",
            Tag::Sidebar => "sidebar",
            Tag::Unknown(name) => name,
        }
    }

    /// True for chapter, preface and section containers.
    pub fn is_section(&self) -> bool {
        matches!(
            self,
            Tag::Chapter { .. } | Tag::Preface { .. } | Tag::Section { .. }
        )
    }

    /// Stable identifier of a section-like tag.
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Tag::Chapter { id } | Tag::Preface { id } | Tag::Section { id } => id.as_deref(),
            _ => None,
        }
    }

    /// True for elements whose text is preformatted and must keep its whitespace.
    pub fn preserves_whitespace(&self) -> bool {
        matches!(
            self,
            Tag::ProgramListing { .. } | Tag::Screen | Tag::LiteralLayout
        )
    }

    /// True for elements whose text interleaves with inline children, where
    /// a line break between two inline elements separates words.
    ///
    /// Unknown elements count as mixed content since they are often inline
    /// (`footnote`, `xref`, `indexterm`).
    pub fn has_mixed_content(&self) -> bool {
        matches!(
            self,
            Tag::Title
                | Tag::SimPara
                | Tag::Para
                | Tag::Literal
                | Tag::Emphasis { .. }
                | Tag::Link { .. }
                | Tag::Term
                | Tag::Attribution
                | Tag::Entry
                | Tag::Unknown(_)
        )
    }
}

/// A child of an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Raw text, entities already resolved.
    Text(String),
    /// Nested element.
    Element(Element),
    /// Processing instruction content, e.g. `asciidoc-hr` for `<?asciidoc-hr?>`.
    Instruction(String),
}

impl Node {
    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The text, if this node is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Tagged node with ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Classified tag.
    pub tag: Tag,
    /// Raw attributes by qualified name (`xml:id`, `xl:href`, ...).
    pub attributes: BTreeMap<String, String>,
    /// Children in source order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element from a local name and its attributes.
    pub fn new(name: &str, attributes: BTreeMap<String, String>) -> Self {
        Self {
            tag: Tag::classify(name, &attributes),
            attributes,
            children: Vec::new(),
        }
    }

    /// Element name.
    pub fn name(&self) -> &str {
        self.tag.name()
    }

    /// Raw attribute lookup.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterate child elements, skipping text and instructions.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element matching `pred`.
    pub fn find_child<F>(&self, pred: F) -> Option<&Element>
    where
        F: Fn(&Tag) -> bool,
    {
        self.child_elements().find(|el| pred(&el.tag))
    }

    /// All child elements matching `pred`, in order.
    pub fn filter_children<F>(&self, pred: F) -> impl Iterator<Item = &Element>
    where
        F: Fn(&Tag) -> bool,
    {
        self.child_elements().filter(move |el| pred(&el.tag))
    }

    /// Concatenation of the direct text children only.
    pub fn direct_text(&self) -> String {
        self.children.iter().filter_map(Node::as_text).collect()
    }

    /// Concatenation of all descendant text, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// True when a direct text child or processing instruction contains `needle`.
    pub fn own_content_contains(&self, needle: &str) -> bool {
        self.children.iter().any(|child| match child {
            Node::Text(text) | Node::Instruction(text) => text.contains(needle),
            Node::Element(_) => false,
        })
    }
}

fn collect_text(children: &[Node], out: &mut String) {
    for child in children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Instruction(_) => {}
        }
    }
}
