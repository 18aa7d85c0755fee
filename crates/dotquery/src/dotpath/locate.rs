//! Dot-path evaluation over `serde_json::Value`.

use serde_json::Value;

use crate::error::{DotQueryError, Result};

use super::Selector;

/// Applies the selectors in order, returning every selected value.
///
/// Traversal errors on the direct path are returned. Once a wildcard has fanned
/// out, branches that cannot be traversed are dropped instead.
pub fn locate<'a>(selectors: &[Selector], document: &'a Value) -> Result<Vec<&'a Value>> {
    let mut current = vec![document];
    let mut fanned_out = false;

    for selector in selectors {
        let mut next = Vec::new();
        for value in current {
            match select(selector, value) {
                Ok(selected) => next.extend(selected),
                Err(error) if fanned_out => {
                    log::trace!("dropping branch: {error}");
                }
                Err(error) => return Err(error),
            }
        }
        if matches!(selector, Selector::Wildcard) {
            fanned_out = true;
        }
        current = next;
    }

    Ok(current)
}

fn select<'a>(selector: &Selector, value: &'a Value) -> Result<Vec<&'a Value>> {
    match (selector, value) {
        (Selector::Member(name) | Selector::Key(name), Value::Object(map)) => {
            Ok(map.get(name).into_iter().collect())
        }
        (Selector::Member(name), Value::Array(items)) => match name.parse::<i64>() {
            Ok(index) => index_into(items, index).map(|item| vec![item]),
            Err(_) => Err(traversal(format!("cannot select key '{name}' from an array"))),
        },
        (Selector::Member(name) | Selector::Key(name), other) => Err(traversal(format!(
            "cannot select key '{name}' from {}",
            kind_of(other)
        ))),
        (Selector::Index(index), Value::Array(items)) => {
            index_into(items, *index).map(|item| vec![item])
        }
        (Selector::Index(index), other) => Err(traversal(format!(
            "cannot select index {index} from {}",
            kind_of(other)
        ))),
        (Selector::Wildcard, Value::Object(map)) => Ok(map.values().collect()),
        (Selector::Wildcard, Value::Array(items)) => Ok(items.iter().collect()),
        (Selector::Wildcard, other) => Err(traversal(format!(
            "cannot expand '*' over {}",
            kind_of(other)
        ))),
    }
}

fn index_into(items: &[Value], index: i64) -> Result<&Value> {
    let resolved = if index < 0 {
        usize::try_from(index.unsigned_abs())
            .ok()
            .and_then(|back| items.len().checked_sub(back))
    } else {
        usize::try_from(index).ok()
    };
    resolved.and_then(|at| items.get(at)).ok_or_else(|| {
        traversal(format!(
            "index {index} out of range for array of length {}",
            items.len()
        ))
    })
}

fn traversal(message: String) -> DotQueryError {
    DotQueryError::PathTraversal(message)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::dotpath::{DotPathLocator, PathLocator};
    use crate::error::DotQueryError;

    fn find(path: &str, document: &serde_json::Value) -> Vec<serde_json::Value> {
        DotPathLocator
            .find(path, document)
            .expect("find")
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn finds_nested_members() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(find("a.b", &doc), vec![json!(1)]);
        assert_eq!(find("a", &doc), vec![json!({"b": 1})]);
    }

    #[test]
    fn missing_key_selects_nothing() {
        let doc = json!({"a": {"b": 1}});
        assert!(find("a.c", &doc).is_empty());
        assert!(find("x.y", &doc).is_empty());
    }

    #[test]
    fn indexes_arrays() {
        let doc = json!({"items": [10, 20, 30]});
        assert_eq!(find("items.1", &doc), vec![json!(20)]);
        assert_eq!(find("items[-1]", &doc), vec![json!(30)]);
        assert_eq!(find("items[*]", &doc), vec![json!(10), json!(20), json!(30)]);
    }

    #[test]
    fn numeric_member_is_a_key_on_objects() {
        let doc = json!({"0": "zero"});
        assert_eq!(find("0", &doc), vec![json!("zero")]);
    }

    #[test]
    fn wildcard_expands_objects_and_arrays() {
        let doc = json!({"items": [{"price": 3}, {"price": 7}, {"name": "x"}]});
        assert_eq!(find("items.*.price", &doc), vec![json!(3), json!(7)]);

        let doc = json!({"scores": {"a": 1, "b": 2}});
        let mut found = find("scores.*", &doc);
        found.sort_by_key(|value| value.as_i64());
        assert_eq!(found, vec![json!(1), json!(2)]);
    }

    #[test]
    fn direct_traversal_errors_are_reported() {
        let doc = json!({"a": 5, "list": [1]});
        for path in ["a.b", "list[3]", "list.name", "a.*", "a[0]"] {
            match DotPathLocator.find(path, &doc) {
                Err(DotQueryError::PathTraversal(_)) => {}
                other => panic!("expected traversal error for {path}, got {other:?}"),
            }
        }
    }

    #[test]
    fn fanned_out_branches_are_dropped_on_error() {
        let doc = json!({"items": [{"tags": ["a"]}, 3, {"tags": []}]});
        assert_eq!(find("items.*.tags[0]", &doc), vec![json!("a")]);
    }

    #[test]
    fn syntax_errors_surface_through_the_locator() {
        match DotPathLocator.find("a..b", &json!({})) {
            Err(DotQueryError::PathSyntax(_)) => {}
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
