//! JSON value navigation and comparison

use std::cmp::Ordering;

use serde_json::Value;

use crate::spec::parse_timestamp;

/// Follows a dotted path through nested objects.
///
/// Returns `None` when a segment is missing or crosses a non-object.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Compares two non-null values of the same kind.
///
/// Numbers compare numerically. Text compares chronologically when both
/// sides parse as timestamps and lexically otherwise. Values of different
/// kinds are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => match (parse_timestamp(a), parse_timestamp(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total order used for sorting.
///
/// Missing < null < bool < number < string < array < object. Among
/// strings, timestamps come first in chronological order, then plain text
/// in lexical order. Other values of the same kind use `compare_values`.
pub fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (parse_timestamp(a), parse_timestamp(b)) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| compare_values(a, b).unwrap_or(Ordering::Equal)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Text form used by LIKE: strings verbatim, other scalars displayed
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
