//! chapterbook -- DocBook-style chapter sources to a typed document model
//!
//! Parses one XML file per book chapter into an ordered element tree,
//! groups it into titled sections, and lists the chapters of a content
//! directory. Rendering the model into presentation nodes lives in the
//! `chapterbook-render` crate.
//!
//! # Pipeline
//!
//! - [`ingest`] turns XML into an [`Element`] tree, keeping mixed content
//!   (text interleaved with inline elements) in source order.
//! - [`document`] groups the tree into a [`Document`] of [`Section`]s.
//! - [`chapters`] lists chapters by file name and loads them, substituting a
//!   placeholder document when a chapter cannot be read or parsed.
//! - [`include`] detects unresolved include directives in code listings and
//!   supplies the referenced code files.
//!
//! # Example
//! ```
//! use chapterbook::parse_document;
//!
//! let doc = parse_document(
//!     r#"<book><info><title>Zig</title></info>
//!        <chapter xml:id="intro"><title>Intro</title><simpara>Hi</simpara></chapter>
//!        </book>"#,
//! )
//! .unwrap();
//! assert_eq!(doc.title, "Zig");
//! assert_eq!(doc.sections[0].id.as_deref(), Some("intro"));
//! ```

#![warn(missing_docs)]
#![deny(clippy::large_enum_variant, clippy::redundant_clone)]
#![warn(
    clippy::needless_collect,
    clippy::map_clone,
    clippy::implicit_clone,
    clippy::inefficient_to_string
)]

pub mod chapters;
pub mod config;
pub mod document;
pub mod error;
pub mod include;
pub mod ingest;
pub mod tree;

// Re-export key types for convenience
pub use chapters::{placeholder_document, ChapterEntry, ChapterLibrary, ChapterNeighbors};
pub use config::{ContentConfig, ParseLimits};
pub use document::{parse_document, parse_document_file, Document, Section, SectionChild};
pub use error::ChapterError;
pub use include::{FsIncludeSource, IncludeDirective, IncludeSource, NoIncludes};
pub use ingest::{parse_element_tree, parse_element_tree_file};
pub use tree::{Element, Node, Numeration, Tag};
