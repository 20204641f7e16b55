//! All error types for the transolution crate.
//!
//! These are returned from all fallible operations (resource loading and saving,
//! solution parsing and serialization, registry lookups by extension, etc.).

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("format error in {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },

    #[error("failed to write entry (key: {key:?}, value: {value:?}, comment: {comment:?}): {source}")]
    Write {
        key: String,
        value: String,
        comment: String,
        #[source]
        source: Box<Error>,
    },

    #[error("solution parse error: {0}")]
    Parse(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a new format error for the resource file at `path`.
    pub fn format_error(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Format {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a new solution parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Returns `true` for the cooperative-cancellation outcome, which callers
    /// should treat as a normal abort rather than a failure to report.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
