//! `QuerySet`: a query bound to its sources.
//!
//! A query set is the unit that crosses a process boundary. It is written to
//! and read from the wire form below, refined with further conditions, and
//! finally resolved into the matching documents of its sources.
//!
//! ```json
//! {
//!   "query_ast": {"type": "condition", "path": "a", "op": "eq", "value": 1, "quantifier": "any"},
//!   "sources": ["data/", "logs/*.jsonl"]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SourceOptions;
use crate::error::{DotQueryError, Result};
use crate::query::{from_tagged, to_tagged, Query};
use crate::source::{
    expand_sources, load_documents, DocumentStream, SourceEntry, SourceWarning, SourceWarningKind,
};


/// Layout of the wire text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireStyle {
    /// Two-space indentation.
    #[default]
    Pretty,
    /// A single line.
    Compact,
}

/// A query plus the ordered source descriptors it runs over.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySet {
    query: Query,
    sources: Vec<String>,
}

impl QuerySet {
    pub fn new(query: Query, sources: Vec<String>) -> Self {
        Self { query, sources }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Parses `tokens` as DSL and combines them with the current query by AND.
    pub fn and(&mut self, tokens: Vec<String>) -> Result<&mut Self> {
        let other = Query::parse_tokens(tokens)?;
        Ok(self.and_query(other))
    }

    /// Parses `tokens` as DSL and combines them with the current query by OR.
    pub fn or(&mut self, tokens: Vec<String>) -> Result<&mut Self> {
        let other = Query::parse_tokens(tokens)?;
        Ok(self.or_query(other))
    }

    pub fn and_query(&mut self, other: Query) -> &mut Self {
        self.replace_query(|current| current.and(other))
    }

    pub fn or_query(&mut self, other: Query) -> &mut Self {
        self.replace_query(|current| current.or(other))
    }

    pub fn negate(&mut self) -> &mut Self {
        self.replace_query(Query::negate)
    }

    fn replace_query(&mut self, combine: impl FnOnce(Query) -> Query) -> &mut Self {
        self.query = combine(self.query.clone());
        log::debug!("query set now holds: {}", self.query);
        self
    }

    pub fn to_wire_value(&self) -> Value {
        json!({
            "query_ast": to_tagged(self.query.expression()),
            "sources": self.sources,
        })
    }

    pub fn to_wire(&self, style: WireStyle) -> String {
        let value = self.to_wire_value();
        match style {
            WireStyle::Pretty => format!("{value:#}"),
            WireStyle::Compact => value.to_string(),
        }
    }

    /// Reads a query set from its wire text. Pretty and compact layouts are
    /// both accepted.
    ///
    /// Every `and`/`or` adds a nesting level to `query_ast`, so the text is
    /// decoded without serde_json's recursion limit, on a growable stack.
    pub fn from_wire(text: &str) -> Result<Self> {
        Self::from_wire_value(&decode_unbounded(text)?)
    }

    pub fn from_wire_value(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(DotQueryError::Deserialization(format!(
                "QuerySet must be a JSON object, got {value}"
            )));
        };

        let tree = object.get("query_ast").ok_or_else(|| {
            DotQueryError::Deserialization("QuerySet is missing `query_ast`".to_string())
        })?;
        let query = Query::new(from_tagged(tree)?);

        let sources = match object.get("sources") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(source) => Ok(source.clone()),
                    other => Err(DotQueryError::Deserialization(format!(
                        "QuerySet `sources` entries must be strings, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(DotQueryError::Deserialization(format!(
                    "QuerySet `sources` must be an array, got {other}"
                )))
            }
            None => {
                return Err(DotQueryError::Deserialization(
                    "QuerySet is missing `sources`".to_string(),
                ))
            }
        };

        Ok(Self::new(query, sources))
    }

    /// Lazily yields the matching documents of every source, with default
    /// source options.
    pub fn resolve(&self) -> Resolution<'_> {
        self.resolve_with(SourceOptions::default())
    }

    pub fn resolve_with(&self, options: SourceOptions) -> Resolution<'_> {
        Resolution {
            query: &self.query,
            entries: Box::new(expand_sources(&self.sources, options)),
            current: None,
        }
    }
}

fn decode_unbounded(text: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// One item pulled from a [`Resolution`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveItem {
    Document(Value),
    Warning(SourceWarning),
}

/// Pull-based resolution of a query set.
///
/// Descriptors are expanded only when the previous one is exhausted, and at
/// most one source file is open at a time. Dropping the iterator closes it.
pub struct Resolution<'a> {
    query: &'a Query,
    entries: Box<dyn Iterator<Item = SourceEntry> + 'a>,
    current: Option<DocumentStream>,
}

impl<'a> Resolution<'a> {
    /// Matching documents only. Warnings are logged and skipped.
    pub fn documents(self) -> impl Iterator<Item = Value> + 'a {
        self.filter_map(|item| match item {
            ResolveItem::Document(document) => Some(document),
            ResolveItem::Warning(warning) => {
                log::warn!("{warning}");
                None
            }
        })
    }

    fn open(&mut self, path: &Path) -> Option<ResolveItem> {
        match load_documents(path) {
            Ok(stream) => {
                self.current = Some(stream);
                None
            }
            Err(error) => Some(ResolveItem::Warning(SourceWarning::for_path(
                path,
                SourceWarningKind::Unreadable(load_failure(error)),
            ))),
        }
    }
}

fn load_failure(error: DotQueryError) -> String {
    match error {
        DotQueryError::Io(error) => error.to_string(),
        DotQueryError::DocumentDecode { message, .. } => message,
        other => other.to_string(),
    }
}

impl Iterator for Resolution<'_> {
    type Item = ResolveItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(stream) = self.current.as_mut() {
                match stream.next() {
                    Some(Ok(document)) => {
                        let matched = self.query.evaluate(&document);
                        log::trace!(
                            "{}: document {} query",
                            stream.path().display(),
                            if matched { "matches" } else { "does not match" }
                        );
                        if matched {
                            return Some(ResolveItem::Document(document));
                        }
                        continue;
                    }
                    Some(Err(warning)) => return Some(ResolveItem::Warning(warning)),
                    None => {
                        // Release the handle before the next source is opened.
                        self.current = None;
                    }
                }
            }

            match self.entries.next()? {
                SourceEntry::File(path) => {
                    if let Some(warning) = self.open(&path) {
                        return Some(warning);
                    }
                }
                SourceEntry::Warning(warning) => return Some(ResolveItem::Warning(warning)),
            }
        }
    }
}
