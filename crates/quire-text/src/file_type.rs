#![forbid(unsafe_code)]

//! Document file types.
//!
//! A document is written either as HTML (full formatting) or as plain text.
//! The mapping is lopsided: only a `.txt` extension selects
//! [`FileType::Txt`]; every other extension, and a missing one, is HTML.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::path::file_extension;

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// HTML markup, the editor's native format.
    #[default]
    Html,
    /// Plain text; formatting is flattened on save.
    Txt,
}

impl FileType {
    /// Infer the type from a path's extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        Self::from_extension(&file_extension(path))
    }

    /// Map a bare extension (without the dot) to a type.
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case("txt") {
            Self::Txt
        } else {
            Self::Html
        }
    }

    /// Default extension used when writing this type.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Txt => "txt",
        }
    }

    /// Wire name (`"html"` / `"txt"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.extension()
    }

    /// Name of the dialog filter offered for this type.
    #[must_use]
    pub const fn filter_name(self) -> &'static str {
        match self {
            Self::Html => "HTML Files",
            Self::Txt => "Text Files",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known [`FileType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFileTypeError(pub String);

impl fmt::Display for ParseFileTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported file type: {:?}", self.0)
    }
}

impl std::error::Error for ParseFileTypeError {}

impl FromStr for FileType {
    type Err = ParseFileTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "txt" => Ok(Self::Txt),
            _ => Err(ParseFileTypeError(s.to_string())),
        }
    }
}

/// One entry of the Save-As format chooser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOption {
    pub file_type: FileType,
    pub title: &'static str,
    pub description: &'static str,
}

/// Choices offered by the Save-As chooser, in display order.
pub const SAVE_OPTIONS: [SaveOption; 2] = [
    SaveOption {
        file_type: FileType::Html,
        title: "HTML",
        description: "Web format with full formatting",
    },
    SaveOption {
        file_type: FileType::Txt,
        title: "Plain Text",
        description: "Simple text without formatting",
    },
];
