//! Condition parameters
//!
//! One atomic `(path, value, operator)` comparison.

use serde::{Deserialize, Serialize};

use super::errors::{SpecError, SpecResult};
use super::operator::Operator;
use super::value::ConditionValue;

/// Splits a dotted attribute path into its segments.
///
/// Rejects empty paths and empty segments (`"a..b"`, `".a"`).
pub fn split_path(path: &str) -> SpecResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(SpecError::invalid_path(path));
    }
    Ok(segments)
}

/// A single comparison against an attribute path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionParameter {
    /// Dotted attribute path
    #[serde(alias = "key")]
    pub path: String,
    /// Compared value
    #[serde(default)]
    pub value: ConditionValue,
    /// Comparison operator
    pub operator: Operator,
}

impl ConditionParameter {
    /// Create a parameter, checking the path and the value shape.
    ///
    /// A null value on an operator that needs one is accepted: such a
    /// parameter is skipped at compile time.
    pub fn new(
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
        operator: Operator,
    ) -> SpecResult<Self> {
        let param = Self::unchecked(path, value, operator);
        param.validate()?;
        Ok(param)
    }

    /// Create a parameter without checks; the compiler checks it later
    pub(crate) fn unchecked(
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
        operator: Operator,
    ) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            operator,
        }
    }

    /// Returns true if this parameter contributes nothing.
    ///
    /// That is the case when the value is null and the operator needs one.
    pub fn is_skipped(&self) -> bool {
        self.value.is_null() && !self.operator.is_nullness()
    }

    /// Checks the path and, unless skipped, the value shape
    pub fn validate(&self) -> SpecResult<()> {
        split_path(&self.path)?;
        if self.is_skipped() {
            return Ok(());
        }
        self.value
            .check_shape(self.operator.expected_shape())
            .map_err(|reason| SpecError::invalid_value(&self.path, self.operator, reason))
    }
}
