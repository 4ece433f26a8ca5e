//! Unified error types for chapterbook
//!
//! Provides a top-level `ChapterError` covering file access, malformed
//! documents and include resolution, plus `From` impls so `?` works across
//! module boundaries.

use core::fmt;

/// Top-level error type for chapterbook operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChapterError {
    /// Chapter source file does not exist
    NotFound {
        /// Path that was looked up.
        path: String,
    },
    /// File exists but could not be read
    Io {
        /// Path that failed to read.
        path: String,
        /// Description of the underlying I/O error.
        message: String,
    },
    /// XML is not well-formed or has no usable root element
    Malformed(String),
    /// Input exceeded a configured parse limit
    LimitExceeded {
        /// Stable limit name.
        kind: &'static str,
        /// Observed value.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Chapter id would resolve outside the content root
    InvalidChapterId(String),
    /// Code file referenced by an include directive could not be read
    IncludeNotFound {
        /// Relative path named by the include directive.
        path: String,
    },
}

impl fmt::Display for ChapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterError::NotFound { path } => write!(f, "Chapter file not found: {}", path),
            ChapterError::Io { path, message } => {
                write!(f, "I/O error reading {}: {}", path, message)
            }
            ChapterError::Malformed(msg) => write!(f, "Malformed document: {}", msg),
            ChapterError::LimitExceeded {
                kind,
                actual,
                limit,
            } => write!(
                f,
                "Limit '{}' exceeded (actual: {}, limit: {})",
                kind, actual, limit
            ),
            ChapterError::InvalidChapterId(id) => write!(f, "Invalid chapter id: {}", id),
            ChapterError::IncludeNotFound { path } => {
                write!(f, "Code file not found: {}", path)
            }
        }
    }
}

impl std::error::Error for ChapterError {}

impl From<quick_xml::Error> for ChapterError {
    fn from(err: quick_xml::Error) -> Self {
        ChapterError::Malformed(err.to_string())
    }
}

impl ChapterError {
    /// Build an access error for `path`, distinguishing a missing file from
    /// other read failures.
    pub(crate) fn from_io(path: &std::path::Path, err: &std::io::Error) -> Self {
        let path = path.display().to_string();
        if err.kind() == std::io::ErrorKind::NotFound {
            ChapterError::NotFound { path }
        } else {
            ChapterError::Io {
                path,
                message: err.to_string(),
            }
        }
    }
}
