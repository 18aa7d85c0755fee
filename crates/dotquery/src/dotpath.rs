//! Dot-path resolution against JSON documents.
//!
//! A dot-path such as `user.tags[*]` or `items.*.price` selects zero or more
//! values inside a document. Conditions only see this module through the
//! [`PathLocator`] trait.

mod locate;
mod parser;

use std::fmt;

use serde_json::Value;

use crate::error::Result;

pub use parser::parse_dot_path;

/// Resolves a path expression against a document.
pub trait PathLocator {
    /// Returns every value selected by `path`.
    ///
    /// Fails on malformed path syntax and on traversal through values that
    /// cannot be traversed.
    fn find<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>>;
}

/// The default locator: parses the dot-path on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotPathLocator;

impl PathLocator for DotPathLocator {
    fn find<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>> {
        parse_dot_path(path)?.find(document)
    }
}

/// A parsed dot-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotPath {
    raw: String,
    selectors: Vec<Selector>,
}

/// One step of a dot-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Bare segment (`a`, `0`). Numeric members also index arrays.
    Member(String),
    /// Quoted bracket key (`['a.b']`); objects only.
    Key(String),
    /// Bracket index (`[2]`, `[-1]`).
    Index(i64),
    /// `*` or `[*]`.
    Wildcard,
}

impl DotPath {
    /// Returns the values selected by this path.
    pub fn find<'a>(&self, document: &'a Value) -> Result<Vec<&'a Value>> {
        locate::locate(&self.selectors, document)
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
