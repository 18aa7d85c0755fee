//! `Query`, the owned root of an expression tree, and condition factories.

use std::fmt;

use serde_json::Value;

use crate::dotpath::PathLocator;
use crate::error::Result;

use super::expression::Expression;
use super::operator::{OperatorId, QuantifierId};
use super::parser::DslParser;

/// A query: one expression tree acting as the root.
///
/// The combinators consume both operands and return a new query whose root is
/// a new combinator node.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    expression: Expression,
}

impl Query {
    pub fn new(expression: Expression) -> Self {
        Self { expression }
    }

    /// A query holding a single condition.
    pub fn condition(
        path: impl Into<String>,
        operator: OperatorId,
        value: impl Into<Value>,
        quantifier: QuantifierId,
    ) -> Self {
        Self::new(Expression::condition(path, operator, value, quantifier))
    }

    /// Parses pre-split DSL words.
    pub fn parse_tokens(tokens: Vec<String>) -> Result<Self> {
        DslParser::new(tokens).parse().map(Self::new)
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn into_expression(self) -> Expression {
        self.expression
    }

    pub fn and(self, other: Query) -> Self {
        Self::new(Expression::and(self.expression, other.expression))
    }

    pub fn or(self, other: Query) -> Self {
        Self::new(Expression::or(self.expression, other.expression))
    }

    pub fn negate(self) -> Self {
        Self::new(Expression::negate(self.expression))
    }

    pub fn evaluate(&self, document: &Value) -> bool {
        self.expression.evaluate(document)
    }

    pub fn evaluate_with<L: PathLocator + ?Sized>(&self, locator: &L, document: &Value) -> bool {
        self.expression.evaluate_with(locator, document)
    }
}

impl From<Expression> for Query {
    fn from(expression: Expression) -> Self {
        Self::new(expression)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Splits DSL text shell-style and parses it into a query.
pub fn parse_dsl(input: &str) -> Result<Query> {
    DslParser::parse_text(input).map(Query::new)
}

/// Any value at `path` equals `value`.
pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Eq, value, QuantifierId::Any)
}

/// Any value at `path` contains `value`.
pub fn contains(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Contains, value, QuantifierId::Any)
}

/// Any value at `path` is greater than `value`.
pub fn greater(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Gt, value, QuantifierId::Any)
}

/// Any value at `path` is less than `value`.
pub fn less(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Lt, value, QuantifierId::Any)
}

/// Any value at `path` starts with a match of `pattern`.
pub fn matches(path: impl Into<String>, pattern: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Matches, pattern, QuantifierId::Any)
}

pub fn all_equals(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Eq, value, QuantifierId::All)
}

pub fn all_contains(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Contains, value, QuantifierId::All)
}

pub fn all_greater(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Gt, value, QuantifierId::All)
}

pub fn all_less(path: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Lt, value, QuantifierId::All)
}

pub fn all_matches(path: impl Into<String>, pattern: impl Into<Value>) -> Query {
    Query::condition(path, OperatorId::Matches, pattern, QuantifierId::All)
}
