//! Query language: AST, evaluation, serialization and the DSL.
//!
//! This module provides:
//! - Expression types (AND, OR, NOT, conditions)
//! - Operator and quantifier registries
//! - Evaluation against JSON documents
//! - The tagged JSON form used on the wire
//! - DSL tokenizing and parsing

mod builder;
mod evaluate;
mod expression;
mod operator;
mod parser;
mod predicate;
mod serialize;
mod tokenize;

pub use builder::{
    all_contains, all_equals, all_greater, all_less, all_matches, contains, equals, greater, less,
    matches, parse_dsl, Query,
};
pub use evaluate::PathLookup;
pub use expression::{Condition, Expression};
pub use operator::{OperatorId, Predicate, QuantifierId};
pub use parser::{parse_value_literal, DslParser};
pub use predicate::compare_values;
pub use serialize::{from_tagged, to_tagged};
pub use tokenize::tokenize_dsl;
