//! Tagged JSON form of expressions.
//!
//! ```text
//! {"type": "and", "left": <node>, "right": <node>}
//! {"type": "or", "left": <node>, "right": <node>}
//! {"type": "not", "expression": <node>}
//! {"type": "condition", "path": "a.b", "op": "eq", "value": 1, "quantifier": "any"}
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{DotQueryError, Result};

use super::expression::{Condition, Expression};
use super::operator::{OperatorId, QuantifierId};

/// Converts an expression into its tagged JSON tree.
pub fn to_tagged(expression: &Expression) -> Value {
    match expression {
        Expression::And(left, right) => json!({
            "type": "and",
            "left": to_tagged(left),
            "right": to_tagged(right),
        }),
        Expression::Or(left, right) => json!({
            "type": "or",
            "left": to_tagged(left),
            "right": to_tagged(right),
        }),
        Expression::Not(inner) => json!({
            "type": "not",
            "expression": to_tagged(inner),
        }),
        Expression::Condition(condition) => json!({
            "type": "condition",
            "path": condition.path,
            "op": condition.operator.name(),
            "value": condition.value,
            "quantifier": condition.quantifier.name(),
        }),
    }
}

/// Rebuilds an expression from its tagged JSON tree.
pub fn from_tagged(tree: &Value) -> Result<Expression> {
    let Some(node) = tree.as_object() else {
        return Err(deserialization(format!(
            "expected an expression object, got {tree}"
        )));
    };

    let tag = match node.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => {
            return Err(deserialization(format!(
                "expression `type` must be a string, got {other}"
            )))
        }
        None => return Err(deserialization("expression is missing `type`".to_string())),
    };

    match tag {
        "and" => Ok(Expression::and(
            from_tagged(required(node, tag, "left")?)?,
            from_tagged(required(node, tag, "right")?)?,
        )),
        "or" => Ok(Expression::or(
            from_tagged(required(node, tag, "left")?)?,
            from_tagged(required(node, tag, "right")?)?,
        )),
        "not" => Ok(Expression::negate(from_tagged(required(
            node,
            tag,
            "expression",
        )?)?)),
        "condition" => condition_from_tagged(node).map(Expression::Condition),
        other => Err(deserialization(format!("unknown expression type: {other}"))),
    }
}

fn condition_from_tagged(node: &Map<String, Value>) -> Result<Condition> {
    let path = required_str(node, "path")?;

    let op = required_str(node, "op")?;
    let operator = OperatorId::from_name(op)
        .ok_or_else(|| deserialization(format!("unknown operator: {op}")))?;

    let quantifier = required_str(node, "quantifier")?;
    let quantifier = QuantifierId::from_name(quantifier)
        .ok_or_else(|| deserialization(format!("unknown quantifier: {quantifier}")))?;

    let value = required(node, "condition", "value")?.clone();

    Ok(Condition::new(path, operator, value, quantifier))
}

fn required<'a>(node: &'a Map<String, Value>, tag: &str, field: &str) -> Result<&'a Value> {
    node.get(field)
        .ok_or_else(|| deserialization(format!("`{tag}` node is missing `{field}`")))
}

fn required_str<'a>(node: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    match required(node, "condition", field)? {
        Value::String(text) => Ok(text.as_str()),
        other => Err(deserialization(format!(
            "`condition` field `{field}` must be a string, got {other}"
        ))),
    }
}

fn deserialization(message: String) -> DotQueryError {
    DotQueryError::Deserialization(message)
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_tagged(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tree = Value::deserialize(deserializer)?;
        from_tagged(&tree).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expression {
        Expression::or(
            Expression::and(
                Expression::condition("a.b", OperatorId::Eq, 1, QuantifierId::Any),
                Expression::condition(
                    "tags.*",
                    OperatorId::Matches,
                    "^foo",
                    QuantifierId::All,
                ),
            ),
            Expression::negate(Expression::condition(
                "meta",
                OperatorId::Contains,
                json!({"nested": [1, null, "x"]}),
                QuantifierId::Any,
            )),
        )
    }

    #[test]
    fn condition_uses_canonical_names() {
        let tagged = to_tagged(&Expression::condition(
            "score",
            OperatorId::Gt,
            10,
            QuantifierId::Any,
        ));
        assert_eq!(
            tagged,
            json!({
                "type": "condition",
                "path": "score",
                "op": "gt",
                "value": 10,
                "quantifier": "any",
            })
        );
    }

    #[test]
    fn tagged_form_round_trips() {
        let tagged = to_tagged(&sample());
        let rebuilt = from_tagged(&tagged).expect("from_tagged");
        assert_eq!(rebuilt, sample());
        assert_eq!(to_tagged(&rebuilt), tagged);
    }

    #[test]
    fn round_trip_preserves_evaluation() {
        let rebuilt = from_tagged(&to_tagged(&sample())).expect("from_tagged");
        let docs = [
            json!({"a": {"b": 1}, "tags": ["foo1", "foo2"]}),
            json!({"a": {"b": 2}, "meta": {"nested": 1}}),
            json!({"meta": [{"nested": [1, null, "x"]}]}),
            json!({}),
        ];
        for doc in docs {
            assert_eq!(rebuilt.evaluate(&doc), sample().evaluate(&doc), "doc: {doc}");
        }
    }

    #[test]
    fn serde_delegates_to_tagged_form() {
        let text = serde_json::to_string(&sample()).expect("serialize");
        let parsed: Expression = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(parsed, sample());
    }

    fn expect_error(tree: Value, needle: &str) {
        match from_tagged(&tree) {
            Err(DotQueryError::Deserialization(message)) => {
                assert!(message.contains(needle), "unexpected message: {message}");
            }
            other => panic!("expected deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_or_unknown_type() {
        expect_error(json!({"left": {}}), "missing `type`");
        expect_error(json!({"type": "xor"}), "unknown expression type: xor");
        expect_error(json!({"type": 3}), "must be a string");
        expect_error(json!([1, 2]), "expected an expression object");
    }

    #[test]
    fn rejects_unknown_operator_and_quantifier() {
        expect_error(
            json!({"type": "condition", "path": "a", "op": "_re_match_op", "value": 1, "quantifier": "any"}),
            "unknown operator: _re_match_op",
        );
        expect_error(
            json!({"type": "condition", "path": "a", "op": "eq", "value": 1, "quantifier": "most"}),
            "unknown quantifier: most",
        );
    }

    #[test]
    fn rejects_missing_fields() {
        expect_error(
            json!({"type": "condition", "op": "eq", "value": 1, "quantifier": "any"}),
            "missing `path`",
        );
        expect_error(
            json!({"type": "condition", "path": "a", "op": "eq", "quantifier": "any"}),
            "missing `value`",
        );
        expect_error(
            json!({"type": "and", "left": {"type": "not", "expression": {"type": "or"}}}),
            "`or` node is missing `left`",
        );
        expect_error(json!({"type": "not"}), "`not` node is missing `expression`");
    }

    #[test]
    fn null_value_is_present_not_missing() {
        let tree = json!({"type": "condition", "path": "a", "op": "eq", "value": null, "quantifier": "any"});
        let expression = from_tagged(&tree).expect("from_tagged");
        assert!(expression.evaluate(&json!({"a": null})));
    }
}
