//! Executor error types
//!
//! Error codes:
//! - EXEC_INVALID_PATTERN
//! - EXEC_BINDING_LIMIT

use std::fmt;

use thiserror::Error;

/// Executor error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// A LIKE pattern could not be turned into a matcher
    InvalidPattern,
    /// A document expanded into more join bindings than allowed
    BindingLimit,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::InvalidPattern => "EXEC_INVALID_PATTERN",
            ExecutorErrorCode::BindingLimit => "EXEC_BINDING_LIMIT",
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error with context
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
}

impl ExecutorError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: impl fmt::Display) -> Self {
        Self {
            code: ExecutorErrorCode::InvalidPattern,
            message: format!("Invalid LIKE pattern '{}': {}", pattern, reason),
        }
    }

    /// Create a binding limit error
    pub fn binding_limit(limit: usize) -> Self {
        Self {
            code: ExecutorErrorCode::BindingLimit,
            message: format!("Document expands into more than {} join bindings", limit),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
