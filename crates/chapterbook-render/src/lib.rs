//! Render tree, block/inline renderer, and outline for `chapterbook`.
//!
//! Features:
//! - `serde`: derive `Serialize` for the render tree.
//! - `cli`: build the `chapterbook` binary.

mod diagram;
mod outline;
mod render_engine;
mod render_inline;
mod render_ir;

pub use diagram::{classify_preformatted, is_diagram, DIAGRAM_KEYWORDS};
pub use outline::{outline, OutlineEntry};
pub use render_engine::{RenderDiagnostic, RenderEngine, RenderOptions, DEFAULT_LANGUAGE};
pub use render_inline::{internal_route, link_span, render_inline};
pub use render_ir::{
    plain_text, AdmonitionKind, CodeBlock, DefinitionEntry, HeadingLevel, InlineSpan, ListStyle,
    RenderNode, RenderedChapter, RenderedSection, Severity, TableCell, TableRow,
    EXTERNAL_LINK_REL, EXTERNAL_LINK_TARGET,
};
