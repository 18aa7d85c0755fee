//! DSL parser.
//!
//! ```text
//! expression := term ('or' term)*
//! term       := factor ('and' factor)*
//! factor     := 'not' factor | '(' expression ')' | condition
//! condition  := [quantifier] operator path value
//! quantifier := 'any' | 'all'
//! operator   := 'equals' | 'contains' | 'greater' | 'less' | 'matches'
//! ```

use serde_json::Value;

use crate::error::{DotQueryError, Result};

use super::expression::{Condition, Expression};
use super::operator::{OperatorId, QuantifierId};
use super::tokenize::tokenize_dsl;

const KEYWORD_AND: &str = "and";
const KEYWORD_OR: &str = "or";
const KEYWORD_NOT: &str = "not";
const OPEN_GROUP: &str = "(";
const CLOSE_GROUP: &str = ")";

/// Recursive-descent parser over pre-split DSL words.
///
/// Single lookahead, no backtracking; the first structural error is returned.
pub struct DslParser {
    tokens: Vec<String>,
    index: usize,
}

impl DslParser {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens, index: 0 }
    }

    /// Splits `input` shell-style and parses the words.
    pub fn parse_text(input: &str) -> Result<Expression> {
        Self::new(tokenize_dsl(input)?).parse()
    }

    pub fn parse(mut self) -> Result<Expression> {
        if self.tokens.is_empty() {
            return Err(DotQueryError::QueryParse("query cannot be empty".to_string()));
        }

        let expression = self.parse_expression()?;
        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected token '{token}' after complete query")));
        }
        Ok(expression)
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let mut node = self.parse_term()?;
        while self.consume(KEYWORD_OR) {
            node = Expression::or(node, self.parse_term()?);
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expression> {
        let mut node = self.parse_factor()?;
        while self.consume(KEYWORD_AND) {
            node = Expression::and(node, self.parse_factor()?);
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        if self.consume(KEYWORD_NOT) {
            return Ok(Expression::negate(self.parse_factor()?));
        }

        if self.peek() == Some(OPEN_GROUP) {
            let open_index = self.index;
            self.advance();
            let expression = self.parse_expression()?;
            if !self.consume(CLOSE_GROUP) {
                let found = self
                    .peek()
                    .map(|token| format!("'{token}'"))
                    .unwrap_or_else(|| "end of query".to_string());
                return Err(self.error(format!(
                    "missing closing ')' for '(' at token {open_index}, found {found}"
                )));
            }
            return Ok(expression);
        }

        if self.peek() == Some(CLOSE_GROUP) {
            return Err(self.error("unexpected ')'".to_string()));
        }

        self.parse_condition().map(Expression::Condition)
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        let quantifier = match self.peek().and_then(QuantifierId::from_name) {
            Some(quantifier) => {
                self.advance();
                quantifier
            }
            None => QuantifierId::default(),
        };

        let Some(keyword) = self.peek() else {
            return Err(self.error("expected a condition but reached end of query".to_string()));
        };
        let operator = OperatorId::from_keyword(keyword).ok_or_else(|| {
            self.error(format!(
                "unknown operator '{keyword}', expected one of {}",
                OperatorId::keywords().collect::<Vec<_>>().join(", ")
            ))
        })?;
        self.advance();

        let path = self.next().ok_or_else(|| {
            self.error(format!(
                "operator '{}' requires a path argument",
                operator.keyword()
            ))
        })?;

        let raw_value = self.next().ok_or_else(|| {
            self.error(format!(
                "operator '{}' requires a value argument after path '{path}'",
                operator.keyword()
            ))
        })?;

        Ok(Condition::new(
            path,
            operator,
            parse_value_literal(raw_value),
            quantifier,
        ))
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.index).map(String::as_str)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn next(&mut self) -> Option<String> {
        let token = self.tokens.get(self.index).cloned()?;
        self.index += 1;
        Some(token)
    }

    fn consume(&mut self, keyword: &str) -> bool {
        self.peek() == Some(keyword) && {
            self.index += 1;
            true
        }
    }

    fn error(&self, message: String) -> DotQueryError {
        DotQueryError::QueryParse(format!("{message} (at token {})", self.index))
    }
}

/// JSON literal when the word is valid JSON, otherwise the raw word as a string.
pub fn parse_value_literal(raw: String) -> Value {
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw),
    }
}
