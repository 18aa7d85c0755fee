//! Source descriptors: expansion into files and loading of documents.

mod expand;
mod load;

use std::fmt;
use std::path::Path;

pub use expand::{expand_descriptor, expand_sources, SourceEntry};
pub use load::{load_documents, DocumentStream, Framing};

/// A non-fatal problem with one source. Resolution continues past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWarning {
    /// The descriptor or file the warning is about.
    pub source: String,
    pub kind: SourceWarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceWarningKind {
    /// Descriptor is not a file, a directory or a glob pattern that matched anything.
    NotFound,
    InvalidPattern(String),
    /// The file could not be opened, read or decoded as a whole.
    Unreadable(String),
    /// One JSONL line was not valid JSON.
    InvalidDocument { line: usize, message: String },
}

impl SourceWarning {
    pub fn new(source: impl Into<String>, kind: SourceWarningKind) -> Self {
        Self {
            source: source.into(),
            kind,
        }
    }

    pub fn for_path(path: &Path, kind: SourceWarningKind) -> Self {
        Self::new(path.display().to_string(), kind)
    }
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SourceWarningKind::NotFound => {
                write!(f, "Source not found or supported: {}", self.source)
            }
            SourceWarningKind::InvalidPattern(message) => {
                write!(f, "Invalid glob pattern {}: {message}", self.source)
            }
            SourceWarningKind::Unreadable(message) => {
                write!(f, "Could not read or parse {}: {message}", self.source)
            }
            SourceWarningKind::InvalidDocument { line, message } => {
                write!(f, "Skipping invalid line {line} of {}: {message}", self.source)
            }
        }
    }
}
