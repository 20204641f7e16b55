//! All supported string-resource file formats for transolution.
//!
//! This module re-exports the codec for each format and provides
//! the [`FormatType`] enum for generic format handling across the crate.

pub mod csv;
pub mod resx;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

// Reexporting the codecs for easier access
pub use csv::CsvCodec;
pub use resx::ResxCodec;

use crate::Error;

/// Represents all built-in string-resource formats.
///
/// The string form of a variant is the tag stored in
/// [`crate::FileReference::format`] and used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// `.resx` XML string resources.
    Resx,
    /// Headerless `key,value,comment` CSV.
    Csv,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use transolution::formats::FormatType;
/// assert_eq!(FormatType::Resx.to_string(), "resx");
/// assert_eq!(FormatType::Csv.to_string(), "csv");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Resx => write!(f, "resx"),
            FormatType::Csv => write!(f, "csv"),
        }
    }
}

/// Accepts `"resx"` and `"csv"`, case-insensitive and ignoring surrounding
/// whitespace. Returns [`crate::error::Error::UnknownFormat`] otherwise.
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "resx" => Ok(FormatType::Resx),
            "csv" => Ok(FormatType::Csv),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// All built-in formats.
    pub const ALL: [FormatType; 2] = [FormatType::Resx, FormatType::Csv];

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Resx => "resx",
            FormatType::Csv => "csv",
        }
    }

    /// Infers the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        FormatType::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
            .ok_or_else(|| {
                Error::UnknownFormat(format!("unsupported file extension: {extension:?}"))
            })
    }
}
