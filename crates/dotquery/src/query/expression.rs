//! Query expression types and AST nodes.

use std::fmt;

use serde_json::Value;

use super::operator::{OperatorId, QuantifierId};

/// A query expression (AST node).
///
/// Trees are immutable: the combinators take ownership of their operands and
/// return a new node, so a subtree always has exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Condition(Condition),
}

/// A leaf condition: the values at `path` compared against `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub operator: OperatorId,
    pub value: Value,
    pub quantifier: QuantifierId,
}

impl Condition {
    pub fn new(
        path: impl Into<String>,
        operator: OperatorId,
        value: impl Into<Value>,
        quantifier: QuantifierId,
    ) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
            quantifier,
        }
    }
}

impl Expression {
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Expression) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn condition(
        path: impl Into<String>,
        operator: OperatorId,
        value: impl Into<Value>,
        quantifier: QuantifierId,
    ) -> Self {
        Self::Condition(Condition::new(path, operator, value, quantifier))
    }

    /// Name of the node's `type` tag in the wire format.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::And(..) => "and",
            Self::Or(..) => "or",
            Self::Not(_) => "not",
            Self::Condition(_) => "condition",
        }
    }
}

impl From<Condition> for Expression {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

/// Renders the expression as DSL text; binary nodes are parenthesized.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(left, right) => write!(f, "({left} and {right})"),
            Self::Or(left, right) => write!(f, "({left} or {right})"),
            Self::Not(inner) => write!(f, "not {inner}"),
            Self::Condition(condition) => write!(f, "{condition}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantifier == QuantifierId::All {
            write!(f, "all ")?;
        }
        write!(f, "{} {} {}", self.operator.keyword(), self.path, self.value)
    }
}
