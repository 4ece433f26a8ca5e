//! Unresolved include directives in code listings
//!
//! Chapter sources converted from AsciiDoc may contain code listings whose
//! only text is a leftover marker such as
//! `Unresolved directive in ch01.adoc - include::example$chapters-data/code/hello.zig[]`.
//! [`IncludeDirective::detect`] recognises that marker and extracts the
//! relative path; an [`IncludeSource`] supplies the referenced file.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ParseLimits;
use crate::error::ChapterError;
use crate::ingest::read_source;

/// Marker text left behind by an include that the converter could not resolve.
pub const UNRESOLVED_MARKER: &str = "Unresolved directive";

/// Matches `include::example$<root>/code/<relative-path>[...]` and captures
/// the relative path (up to the attribute list bracket).
static INCLUDE_PATH_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"include::example\$[^\[\]\s]*?/code/([^\[\]]+)").ok());

/// An include directive found in a code listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Path relative to the code examples root.
    pub relative_path: String,
}

impl IncludeDirective {
    /// Detect an unresolved include directive in listing text.
    ///
    /// Returns `None` when the marker is absent or the directive does not
    /// name a path under a `code/` directory.
    ///
    /// # Example
    /// ```
    /// use chapterbook::include::IncludeDirective;
    ///
    /// let text = "Unresolved directive include::example$chapters-data/code/hello.zig[]";
    /// let directive = IncludeDirective::detect(text).unwrap();
    /// assert_eq!(directive.relative_path, "hello.zig");
    /// ```
    pub fn detect(text: &str) -> Option<Self> {
        if !text.contains(UNRESOLVED_MARKER) || !text.contains("include::") {
            return None;
        }
        let captures = INCLUDE_PATH_RE.as_ref()?.captures(text)?;
        let relative_path = captures.get(1)?.as_str().trim();
        if relative_path.is_empty() {
            return None;
        }
        Some(Self {
            relative_path: relative_path.to_string(),
        })
    }
}

/// Supplier of included code files.
pub trait IncludeSource {
    /// Read the file at `relative_path` under the code examples root.
    fn read_include(&self, relative_path: &str) -> Result<String, ChapterError>;
}

/// Include source that never resolves anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIncludes;

impl IncludeSource for NoIncludes {
    fn read_include(&self, relative_path: &str) -> Result<String, ChapterError> {
        Err(ChapterError::IncludeNotFound {
            path: relative_path.to_string(),
        })
    }
}

/// Include source reading from a directory on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsIncludeSource {
    root: PathBuf,
    limits: ParseLimits,
}

impl FsIncludeSource {
    /// Read includes relative to `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            limits: ParseLimits::default(),
        }
    }

    /// Set the size limit applied to included files.
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Code examples root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IncludeSource for FsIncludeSource {
    fn read_include(&self, relative_path: &str) -> Result<String, ChapterError> {
        read_include_under(&self.root, relative_path, self.limits)
    }
}

/// Read `relative_path` below `root`, refusing paths that could leave it.
///
/// Files larger than `limits.max_file_bytes` fail with
/// [`ChapterError::LimitExceeded`]; any other failure is `IncludeNotFound`.
pub(crate) fn read_include_under(
    root: &Path,
    relative_path: &str,
    limits: ParseLimits,
) -> Result<String, ChapterError> {
    let not_found = || ChapterError::IncludeNotFound {
        path: relative_path.to_string(),
    };
    if !is_contained(Path::new(relative_path)) {
        return Err(not_found());
    }
    match read_source(&root.join(relative_path), limits) {
        Ok(text) => Ok(text),
        Err(err @ ChapterError::LimitExceeded { .. }) => Err(err),
        Err(_) => Err(not_found()),
    }
}

/// True when `path` is relative and never steps above its base.
pub(crate) fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
