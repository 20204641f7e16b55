//! Transient values exchanged with the resource codecs.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A single (key, value, comment) triple of a string-resource file.
///
/// An absent comment is represented by the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ResourceEntry {
    /// Resource name, unique within one file.
    pub key: String,

    /// The string value, kept verbatim.
    pub value: String,

    /// Translator comment; empty when the file has none.
    #[serde(default)]
    pub comment: String,
}

impl ResourceEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: comment.into(),
        }
    }
}

impl Display for ResourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entry {{ key: {}, value: {} }}", self.key, self.value)
    }
}

/// How the closing step of a save went.
///
/// Failures here are never raised; they are reported so callers can tell that
/// the file on disk may be incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalize {
    /// Closing markup written and output flushed.
    Completed,
    /// Closing markup or flush failed; the file may be truncated.
    Failed(String),
}

impl Finalize {
    pub fn is_completed(&self) -> bool {
        matches!(self, Finalize::Completed)
    }
}

/// Result of a successful [`crate::ResourceCodec::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    /// Number of entries written.
    pub written: usize,
    /// Outcome of the finalize step.
    pub finalize: Finalize,
}
