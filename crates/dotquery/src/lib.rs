//! Chainable boolean queries over JSON and JSONL documents.
//!
//! This crate provides:
//! - A query AST with AND / OR / NOT and quantified conditions
//! - A shell-style DSL and a tagged JSON wire form
//! - Dot-path lookup into documents
//! - `QuerySet`, which binds a query to sources and resolves it lazily

pub mod config;
pub mod dotpath;
pub mod error;
pub mod query;
pub mod queryset;
pub mod source;

// Re-export main types
pub use config::{Config, OutputOptions, SourceOptions};
pub use dotpath::{DotPath, DotPathLocator, PathLocator};
pub use error::{DotQueryError, Result};
pub use query::{
    parse_dsl, Condition, DslParser, Expression, OperatorId, PathLookup, QuantifierId, Query,
};
pub use queryset::{QuerySet, Resolution, ResolveItem, WireStyle};
pub use source::{SourceEntry, SourceWarning, SourceWarningKind};
