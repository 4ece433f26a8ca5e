//! Chapter listing and loading
//!
//! [`ChapterLibrary`] maps the `NN__slug` file naming convention of a
//! content directory onto an ordered chapter listing, and loads chapter
//! documents by id. [`ChapterLibrary::load_chapter`] never fails: any
//! access or parse error is turned into a placeholder document that
//! describes the failure.

use std::path::{Path, PathBuf};

use crate::config::ContentConfig;
use crate::document::{parse_document_file, Document, Section, SectionChild};
use crate::error::ChapterError;
use crate::include::{read_include_under, IncludeSource};
use crate::tree::{Element, Node};

/// Section id of the placeholder document.
pub const PLACEHOLDER_SECTION_ID: &str = "parse-error";

/// Section title of the placeholder document.
pub const PLACEHOLDER_SECTION_TITLE: &str = "Failed to parse chapter content";

/// Extension of chapter content files.
const CHAPTER_EXTENSION: &str = "xml";

/// One entry of the chapter listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterEntry {
    /// File name without extension, e.g. `01__getting-started`.
    pub id: String,
    /// Two-digit ordering number, e.g. `01`.
    pub number: String,
    /// Display title, e.g. `Getting Started`.
    pub title: String,
}

/// Chapters adjacent to a given chapter in listing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChapterNeighbors {
    /// Chapter before, if any.
    pub previous: Option<ChapterEntry>,
    /// Chapter after, if any.
    pub next: Option<ChapterEntry>,
}

/// Chapter sources rooted at a content directory.
#[derive(Clone, Debug)]
pub struct ChapterLibrary {
    config: ContentConfig,
}

impl ChapterLibrary {
    /// Create a library over `config`.
    pub fn new(config: ContentConfig) -> Self {
        Self { config }
    }

    /// Content configuration.
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// List chapters from file names matching `NN__slug.<ext>`, sorted by
    /// file name.
    ///
    /// A missing or unreadable content directory yields an empty listing.
    pub fn list_chapters(&self) -> Vec<ChapterEntry> {
        let root = self.config.content_root();
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(
                    "Cannot list chapters in '{}': {}",
                    root.display(),
                    err
                );
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();

        let extension = self.config.listing_extension();
        let chapters: Vec<ChapterEntry> = names
            .iter()
            .filter_map(|name| parse_listing_name(name, extension))
            .collect();
        log::debug!(
            "listed {} chapters in '{}'",
            chapters.len(),
            root.display()
        );
        chapters
    }

    /// Listing entry for `id`, if present.
    pub fn find_chapter(&self, id: &str) -> Option<ChapterEntry> {
        self.list_chapters().into_iter().find(|entry| entry.id == id)
    }

    /// Previous and next chapters around `id` in listing order.
    pub fn neighbors(&self, id: &str) -> ChapterNeighbors {
        let chapters = self.list_chapters();
        let Some(index) = chapters.iter().position(|entry| entry.id == id) else {
            return ChapterNeighbors::default();
        };
        ChapterNeighbors {
            previous: index
                .checked_sub(1)
                .and_then(|prev| chapters.get(prev))
                .cloned(),
            next: chapters.get(index + 1).cloned(),
        }
    }

    /// Path of the content file for `id`.
    pub fn chapter_path(&self, id: &str) -> Result<PathBuf, ChapterError> {
        validate_chapter_id(id)?;
        Ok(self
            .config
            .content_root()
            .join(format!("{}.{}", id, CHAPTER_EXTENSION)))
    }

    /// Load and parse the chapter `id`.
    pub fn try_load_chapter(&self, id: &str) -> Result<Document, ChapterError> {
        let path = self.chapter_path(id)?;
        parse_document_file(&path, self.config.limits())
    }

    /// Load the chapter `id`, substituting a placeholder document on failure.
    pub fn load_chapter(&self, id: &str) -> Document {
        match self.try_load_chapter(id) {
            Ok(document) => document,
            Err(err) => {
                log::warn!("Chapter '{}' unavailable: {}", id, err);
                placeholder_document(id, &err)
            }
        }
    }
}

impl IncludeSource for ChapterLibrary {
    fn read_include(&self, relative_path: &str) -> Result<String, ChapterError> {
        read_include_under(self.config.code_root(), relative_path, self.config.limits())
    }
}

/// Single-section document describing why chapter `id` could not be loaded.
pub fn placeholder_document(id: &str, err: &ChapterError) -> Document {
    let mut paragraph = Element::new("simpara", Default::default());
    paragraph.children.push(Node::Text(err.to_string()));

    Document {
        title: placeholder_title(id),
        sections: vec![Section {
            id: Some(PLACEHOLDER_SECTION_ID.to_string()),
            title: Some(vec![Node::Text(PLACEHOLDER_SECTION_TITLE.to_string())]),
            children: vec![SectionChild::Block(paragraph)],
        }],
    }
}

/// Parse `NN__slug.<ext>` into a listing entry.
fn parse_listing_name(name: &str, extension: &str) -> Option<ChapterEntry> {
    let stem = name.strip_suffix(extension)?.strip_suffix('.')?;
    let (number, slug) = split_number_prefix(stem)?;
    if slug.is_empty() {
        return None;
    }
    Some(ChapterEntry {
        id: stem.to_string(),
        number: number.to_string(),
        title: title_case(&slug.replace('-', " ")),
    })
}

/// Split `NN__rest` into `("NN", "rest")`.
fn split_number_prefix(stem: &str) -> Option<(&str, &str)> {
    let number = stem.get(..2)?;
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = stem.get(2..)?.strip_prefix("__")?;
    Some((number, rest))
}

fn placeholder_title(id: &str) -> String {
    let bare = split_number_prefix(id).map_or(id, |(_, rest)| rest);
    bare.replace('-', " ")
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Uppercase the first word character after each non-word boundary.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_word = false;
    for c in text.chars() {
        let is_word = is_word_char(c);
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

fn validate_chapter_id(id: &str) -> Result<(), ChapterError> {
    let escapes = id.contains('/')
        || id.contains('\\')
        || id.contains("..")
        || Path::new(id).is_absolute();
    if id.is_empty() || escapes {
        return Err(ChapterError::InvalidChapterId(id.to_string()));
    }
    Ok(())
}
