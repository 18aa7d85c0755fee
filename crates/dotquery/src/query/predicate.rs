//! Binary predicates behind the condition operators.
//!
//! Every predicate takes the matched value on the left and the condition value
//! on the right. They are total: values that cannot be compared yield `false`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use regex::Regex;
use serde_json::{Number, Value};

/// Structural equality with numeric normalization (`1 == 1.0`).
pub fn value_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| value_equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| value_equals(x, y)))
        }
        _ => left == right,
    }
}

/// Needle on the right, container on the left.
pub fn value_contains(container: &Value, needle: &Value) -> bool {
    match (container, needle) {
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::Array(items), needle) => items.iter().any(|item| value_equals(item, needle)),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    }
}

pub fn value_greater(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Some(Ordering::Greater)
}

pub fn value_less(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Some(Ordering::Less)
}

/// Start-anchored regular expression match on the string form of `left`.
pub fn value_matches(left: &Value, pattern: &Value) -> bool {
    let pattern = string_form(pattern);
    let Some(regex) = REGEX_CACHE.get_or_compile(&pattern) else {
        return false;
    };
    regex.is_match(&string_form(left))
}

/// Orders two JSON values when their types are comparable.
///
/// - Numbers: integers exactly, otherwise as f64
/// - Strings: lexicographically
/// - Booleans: false < true
/// - Arrays: lexicographically, element by element
/// - Null, objects and mismatched types: `None`
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b) {
                match compare_values(x, y)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => None,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    compare_numbers(a, b) == Some(Ordering::Equal)
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Strings verbatim, everything else as compact JSON text.
fn string_form(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Distinct patterns kept before the cache is emptied and refilled.
const REGEX_CACHE_CAPACITY: usize = 256;

static REGEX_CACHE: LazyLock<RegexCache> =
    LazyLock::new(|| RegexCache::with_capacity(REGEX_CACHE_CAPACITY));

/// Process-wide cache of anchored patterns. Invalid patterns are cached as `None`.
///
/// Holds at most `capacity` patterns; inserting past that clears it first.
struct RegexCache {
    capacity: usize,
    cache: RwLock<HashMap<String, Option<Regex>>>,
}

impl RegexCache {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or_default()
    }

    fn get_or_compile(&self, pattern: &str) -> Option<Regex> {
        if let Ok(cache) = self.cache.read() {
            if let Some(compiled) = cache.get(pattern) {
                return compiled.clone();
            }
        }

        // The bare pattern must compile on its own, otherwise a stray `)` could
        // escape the anchoring group.
        let compiled = match Regex::new(pattern)
            .and_then(|_| Regex::new(&format!(r"\A(?:{pattern})")))
        {
            Ok(regex) => Some(regex),
            Err(error) => {
                log::debug!("invalid pattern {pattern:?}: {error}");
                None
            }
        };
        if let Ok(mut cache) = self.cache.write() {
            if cache.len() >= self.capacity {
                log::debug!("regex cache full at {} patterns, clearing", cache.len());
                cache.clear();
            }
            cache.insert(pattern.to_string(), compiled.clone());
        }
        compiled
    }
}
