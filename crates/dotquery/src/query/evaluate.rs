//! Expression evaluation against documents.

use serde_json::Value;

use crate::dotpath::{DotPathLocator, PathLocator};

use super::expression::{Condition, Expression};

/// Outcome of looking a condition's path up in a document.
///
/// A locator failure and an empty match are the same outcome here.
#[derive(Debug)]
pub enum PathLookup<'a> {
    Found(Vec<&'a Value>),
    Unavailable,
}

impl<'a> PathLookup<'a> {
    pub fn resolve<L: PathLocator + ?Sized>(locator: &L, path: &str, document: &'a Value) -> Self {
        match locator.find(path, document) {
            Ok(values) if !values.is_empty() => Self::Found(values),
            Ok(_) => Self::Unavailable,
            Err(error) => {
                log::trace!("path {path:?} unavailable: {error}");
                Self::Unavailable
            }
        }
    }
}

impl Expression {
    /// Evaluates the expression with the default dot-path locator.
    pub fn evaluate(&self, document: &Value) -> bool {
        self.evaluate_with(&DotPathLocator, document)
    }

    /// Evaluates the expression, resolving condition paths through `locator`.
    ///
    /// `and` skips its right operand when the left is false; `or` skips it when
    /// the left is true.
    pub fn evaluate_with<L: PathLocator + ?Sized>(&self, locator: &L, document: &Value) -> bool {
        match self {
            Expression::And(left, right) => {
                left.evaluate_with(locator, document) && right.evaluate_with(locator, document)
            }
            Expression::Or(left, right) => {
                left.evaluate_with(locator, document) || right.evaluate_with(locator, document)
            }
            Expression::Not(inner) => !inner.evaluate_with(locator, document),
            Expression::Condition(condition) => condition.evaluate_with(locator, document),
        }
    }
}

impl Condition {
    pub fn evaluate_with<L: PathLocator + ?Sized>(&self, locator: &L, document: &Value) -> bool {
        match PathLookup::resolve(locator, &self.path, document) {
            PathLookup::Unavailable => false,
            PathLookup::Found(values) => self.quantifier.reduce(
                values
                    .into_iter()
                    .map(|matched| self.operator.apply(matched, &self.value)),
            ),
        }
    }
}
