//! Content locations and parse limits
//!
//! All path resolution goes through an explicit [`ContentConfig`] handed to
//! the chapter library at construction. [`ContentConfig::from_env`] is the
//! only place that consults the process environment.

use std::path::{Path, PathBuf};

/// Default content directory, relative to the working directory.
pub const DEFAULT_CONTENT_ROOT: &str = "pages";

/// Environment variable overriding the content directory.
pub const CONTENT_ROOT_ENV: &str = "CHAPTERBOOK_PAGES_DIR";

/// Default source extension scanned by chapter listing.
pub const DEFAULT_LISTING_EXTENSION: &str = "adoc";

/// Subdirectory of the content root holding included code examples.
const CODE_DIR: &str = "code";

/// Maximum element nesting accepted while parsing.
const DEFAULT_MAX_DEPTH: usize = 256;

/// Maximum chapter file size accepted while parsing (16 MiB).
const DEFAULT_MAX_FILE_BYTES: usize = 16 * 1024 * 1024;

/// Runtime-configurable parse safety limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum element nesting depth.
    pub max_depth: usize,
    /// Maximum size in bytes of a chapter source file.
    pub max_file_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl ParseLimits {
    /// Create explicit parse limits.
    pub fn new(max_depth: usize, max_file_bytes: usize) -> Self {
        Self {
            max_depth,
            max_file_bytes,
        }
    }
}

/// Where chapter sources and code examples live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentConfig {
    content_root: PathBuf,
    code_root: PathBuf,
    listing_extension: String,
    limits: ParseLimits,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_ROOT)
    }
}

impl ContentConfig {
    /// Configuration rooted at `content_root`, with code examples under
    /// `<content_root>/code`.
    pub fn new<P: Into<PathBuf>>(content_root: P) -> Self {
        let content_root = content_root.into();
        let code_root = content_root.join(CODE_DIR);
        Self {
            content_root,
            code_root,
            listing_extension: DEFAULT_LISTING_EXTENSION.to_string(),
            limits: ParseLimits::default(),
        }
    }

    /// Configuration from `CHAPTERBOOK_PAGES_DIR`, defaulting to `pages`.
    pub fn from_env() -> Self {
        match std::env::var(CONTENT_ROOT_ENV) {
            Ok(root) if !root.trim().is_empty() => Self::new(root),
            _ => Self::default(),
        }
    }

    /// Override the code examples root.
    pub fn with_code_root<P: Into<PathBuf>>(mut self, code_root: P) -> Self {
        self.code_root = code_root.into();
        self
    }

    /// Override the extension scanned by chapter listing (without the dot).
    pub fn with_listing_extension(mut self, extension: &str) -> Self {
        self.listing_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Override parse limits.
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Directory holding chapter sources.
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Directory holding included code examples.
    pub fn code_root(&self) -> &Path {
        &self.code_root
    }

    /// Extension scanned by chapter listing.
    pub fn listing_extension(&self) -> &str {
        &self.listing_extension
    }

    /// Parse limits.
    pub fn limits(&self) -> ParseLimits {
        self.limits
    }
}
