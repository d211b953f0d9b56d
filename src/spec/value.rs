//! Condition values
//!
//! The dynamic payload carried by a condition parameter: a scalar, a
//! list (IN / NOT_IN) or a two-element list used as a pair (BETWEEN).

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::operator::ValueShape;

/// A value compared against an attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ConditionValue>),
}

impl ConditionValue {
    /// Build a two-element pair
    pub fn pair(lower: impl Into<ConditionValue>, upper: impl Into<ConditionValue>) -> Self {
        ConditionValue::List(vec![lower.into(), upper.into()])
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConditionValue::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ConditionValue::List(_))
    }

    /// Numeric view of the value, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConditionValue::Int(i) => Some(*i as f64),
            ConditionValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConditionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConditionValue]> {
        match self {
            ConditionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the `(lower, upper)` bounds of a pair
    pub fn as_pair(&self) -> Option<(&ConditionValue, &ConditionValue)> {
        match self.as_list() {
            Some([lower, upper]) => Some((lower, upper)),
            _ => None,
        }
    }

    /// Text rendering used by the pattern operators.
    ///
    /// Text is used verbatim; other scalars use their display form.
    pub fn to_text(&self) -> String {
        match self {
            ConditionValue::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Converts to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConditionValue::Null => serde_json::Value::Null,
            ConditionValue::Bool(b) => serde_json::Value::Bool(*b),
            ConditionValue::Int(i) => serde_json::Value::from(*i),
            ConditionValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConditionValue::Text(s) => serde_json::Value::String(s.clone()),
            ConditionValue::List(items) => {
                serde_json::Value::Array(items.iter().map(ConditionValue::to_json).collect())
            }
        }
    }

    /// Checks that a non-null value fits the given shape.
    ///
    /// Returns the reason on mismatch.
    pub(crate) fn check_shape(&self, shape: ValueShape) -> Result<(), String> {
        match shape {
            ValueShape::None => Ok(()),
            ValueShape::Scalar | ValueShape::Text => {
                if self.is_list() {
                    Err("expected a single value, found a list".into())
                } else {
                    Ok(())
                }
            }
            ValueShape::Number => match self {
                ConditionValue::Int(_) | ConditionValue::Float(_) => Ok(()),
                other => Err(format!("expected a number, found {}", other.kind())),
            },
            ValueShape::Temporal => match self {
                ConditionValue::Int(_) | ConditionValue::Float(_) => Ok(()),
                ConditionValue::Text(s) if parse_timestamp(s).is_some() => Ok(()),
                ConditionValue::Text(s) => Err(format!("'{}' is not a timestamp", s)),
                other => Err(format!("expected a timestamp, found {}", other.kind())),
            },
            ValueShape::List => match self {
                ConditionValue::List(_) => Ok(()),
                other => Err(format!("expected a list, found {}", other.kind())),
            },
            ValueShape::Pair => match self.as_pair() {
                Some((lower, upper)) => {
                    if lower.is_null() || upper.is_null() {
                        Err("pair bounds must not be null".into())
                    } else if lower.is_list() || upper.is_list() {
                        Err("pair bounds must be single values".into())
                    } else {
                        Ok(())
                    }
                }
                None => Err(format!("expected a [lower, upper] pair, found {}", self.kind())),
            },
            ValueShape::Size => match self {
                ConditionValue::Int(i) if *i >= 0 => Ok(()),
                ConditionValue::Int(i) => Err(format!("size must not be negative, found {}", i)),
                other => Err(format!("expected a size, found {}", other.kind())),
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ConditionValue::Null => "null",
            ConditionValue::Bool(_) => "a boolean",
            ConditionValue::Int(_) => "an integer",
            ConditionValue::Float(_) => "a float",
            ConditionValue::Text(_) => "text",
            ConditionValue::List(items) if items.len() == 2 => "a pair",
            ConditionValue::List(_) => "a list",
        }
    }
}

/// Parses the timestamp formats accepted by the temporal operators.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (also with a space
/// separator) and bare dates at midnight. Offsets are normalized to UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Null => write!(f, "NULL"),
            ConditionValue::Bool(b) => write!(f, "{}", b),
            ConditionValue::Int(i) => write!(f, "{}", i),
            ConditionValue::Float(v) => write!(f, "{}", v),
            ConditionValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            ConditionValue::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        ConditionValue::Bool(value)
    }
}

impl From<i32> for ConditionValue {
    fn from(value: i32) -> Self {
        ConditionValue::Int(value.into())
    }
}

impl From<i64> for ConditionValue {
    fn from(value: i64) -> Self {
        ConditionValue::Int(value)
    }
}

impl From<u32> for ConditionValue {
    fn from(value: u32) -> Self {
        ConditionValue::Int(value.into())
    }
}

impl From<u64> for ConditionValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => ConditionValue::Int(i),
            Err(_) => ConditionValue::Float(value as f64),
        }
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        ConditionValue::Float(value)
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Text(value)
    }
}

impl From<&String> for ConditionValue {
    fn from(value: &String) -> Self {
        ConditionValue::Text(value.clone())
    }
}

impl From<DateTime<Utc>> for ConditionValue {
    fn from(value: DateTime<Utc>) -> Self {
        ConditionValue::Text(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl From<NaiveDateTime> for ConditionValue {
    fn from(value: NaiveDateTime) -> Self {
        ConditionValue::Text(value.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDate> for ConditionValue {
    fn from(value: NaiveDate) -> Self {
        ConditionValue::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<ConditionValue>> From<Option<T>> for ConditionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ConditionValue::Null)
    }
}

impl<T: Into<ConditionValue>> From<Vec<T>> for ConditionValue {
    fn from(values: Vec<T>) -> Self {
        ConditionValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for ConditionValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConditionValue::Null,
            serde_json::Value::Bool(b) => ConditionValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConditionValue::Int(i),
                None => ConditionValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ConditionValue::Text(s),
            serde_json::Value::Array(items) => {
                ConditionValue::List(items.into_iter().map(ConditionValue::from).collect())
            }
            other => ConditionValue::Text(other.to_string()),
        }
    }
}
