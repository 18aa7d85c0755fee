//! Operator and quantifier registries.
//!
//! Each closed set is backed by one static table. The parser looks operators up
//! by DSL keyword, the serializer by canonical name, and the evaluator takes the
//! predicate or reducer from the same row.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::predicate::{value_contains, value_equals, value_greater, value_less, value_matches};

/// Binary predicate applied to `(matched value, condition value)`.
pub type Predicate = fn(&Value, &Value) -> bool;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    Eq,
    Contains,
    Gt,
    Lt,
    Matches,
}

struct OperatorEntry {
    id: OperatorId,
    /// Canonical name used in the wire format.
    name: &'static str,
    /// Word used in the DSL.
    keyword: &'static str,
    predicate: Predicate,
}

static OPERATORS: [OperatorEntry; 5] = [
    OperatorEntry {
        id: OperatorId::Eq,
        name: "eq",
        keyword: "equals",
        predicate: value_equals,
    },
    OperatorEntry {
        id: OperatorId::Contains,
        name: "contains",
        keyword: "contains",
        predicate: value_contains,
    },
    OperatorEntry {
        id: OperatorId::Gt,
        name: "gt",
        keyword: "greater",
        predicate: value_greater,
    },
    OperatorEntry {
        id: OperatorId::Lt,
        name: "lt",
        keyword: "less",
        predicate: value_less,
    },
    OperatorEntry {
        id: OperatorId::Matches,
        name: "matches",
        keyword: "matches",
        predicate: value_matches,
    },
];

impl OperatorId {
    pub const ALL: [OperatorId; 5] = [
        OperatorId::Eq,
        OperatorId::Contains,
        OperatorId::Gt,
        OperatorId::Lt,
        OperatorId::Matches,
    ];

    fn entry(self) -> &'static OperatorEntry {
        // Every variant has exactly one row; the table order follows `ALL`.
        &OPERATORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn keyword(self) -> &'static str {
        self.entry().keyword
    }

    /// Looks an operator up by its wire name (`eq`, `gt`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id)
    }

    /// Looks an operator up by its DSL keyword (`equals`, `greater`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|entry| entry.keyword == keyword)
            .map(|entry| entry.id)
    }

    /// All DSL keywords, in table order.
    pub fn keywords() -> impl Iterator<Item = &'static str> {
        OPERATORS.iter().map(|entry| entry.keyword)
    }

    /// Applies the operator with the matched value on the left.
    pub fn apply(self, matched: &Value, value: &Value) -> bool {
        (self.entry().predicate)(matched, value)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for OperatorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for OperatorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown operator: {name}")))
    }
}

/// How a condition reduces the predicate results across multiple matched values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuantifierId {
    #[default]
    Any,
    All,
}

struct QuantifierEntry {
    id: QuantifierId,
    name: &'static str,
    reduce: fn(&mut dyn Iterator<Item = bool>) -> bool,
}

fn reduce_any(results: &mut dyn Iterator<Item = bool>) -> bool {
    for result in results {
        if result {
            return true;
        }
    }
    false
}

fn reduce_all(results: &mut dyn Iterator<Item = bool>) -> bool {
    for result in results {
        if !result {
            return false;
        }
    }
    true
}

static QUANTIFIERS: [QuantifierEntry; 2] = [
    QuantifierEntry {
        id: QuantifierId::Any,
        name: "any",
        reduce: reduce_any,
    },
    QuantifierEntry {
        id: QuantifierId::All,
        name: "all",
        reduce: reduce_all,
    },
];

impl QuantifierId {
    fn entry(self) -> &'static QuantifierEntry {
        &QUANTIFIERS[self as usize]
    }

    /// Canonical name, shared by the DSL and the wire format.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        QUANTIFIERS
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id)
    }

    /// Reduces predicate results. Stops pulling as soon as the outcome is known.
    pub fn reduce(self, results: impl Iterator<Item = bool>) -> bool {
        let mut results = results;
        (self.entry().reduce)(&mut results)
    }
}

impl fmt::Display for QuantifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for QuantifierId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for QuantifierId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown quantifier: {name}")))
    }
}
