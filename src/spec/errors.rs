//! Specification error types
//!
//! Error codes:
//! - SPEC_INVALID_PATH
//! - SPEC_INVALID_VALUE
//! - SPEC_INVALID_CONDITION

use std::fmt;

use thiserror::Error;

use super::operator::Operator;

/// Specification error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorCode {
    /// Attribute or join path is empty or has an empty segment
    InvalidPath,
    /// Value shape does not fit the operator
    InvalidValue,
    /// Serialized condition could not be read
    InvalidCondition,
}

impl SpecErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SpecErrorCode::InvalidPath => "SPEC_INVALID_PATH",
            SpecErrorCode::InvalidValue => "SPEC_INVALID_VALUE",
            SpecErrorCode::InvalidCondition => "SPEC_INVALID_CONDITION",
        }
    }
}

impl fmt::Display for SpecErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Specification error with context
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct SpecError {
    code: SpecErrorCode,
    message: String,
    path: Option<String>,
    operator: Option<Operator>,
}

impl SpecError {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        let p = path.into();
        Self {
            code: SpecErrorCode::InvalidPath,
            message: format!("Path '{}' has an empty segment", p),
            path: Some(p),
            operator: None,
        }
    }

    /// Create an invalid comparison value error
    pub fn invalid_value(
        path: impl Into<String>,
        operator: Operator,
        reason: impl Into<String>,
    ) -> Self {
        let p = path.into();
        Self {
            code: SpecErrorCode::InvalidValue,
            message: format!(
                "Invalid comparison value for {} on '{}': {}",
                operator,
                p,
                reason.into()
            ),
            path: Some(p),
            operator: Some(operator),
        }
    }

    /// Create an invalid condition error
    pub fn invalid_condition(reason: impl Into<String>) -> Self {
        Self {
            code: SpecErrorCode::InvalidCondition,
            message: reason.into(),
            path: None,
            operator: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SpecErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending path if applicable
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the operator if applicable
    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }
}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        SpecError::invalid_condition(err.to_string())
    }
}

/// Result type for specification operations
pub type SpecResult<T> = Result<T, SpecError>;
