//! CLI-specific error types
//!
//! Every CLI error is fatal: it is written as an error response and the
//! process exits non-zero. Errors from the engine keep their own codes.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::repository::RepositoryError;
use crate::spec::SpecError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// File or stdout I/O error
    IoError,
    /// Input file is not the expected JSON
    InvalidInput,
    /// Request rejected by the engine, carrying the engine's code
    Rejected(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::InvalidInput => "CLI_INVALID_INPUT",
            Self::Rejected(code) => code,
        }
    }
}

impl fmt::Display for CliErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// CLI error
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_input(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SpecError> for CliError {
    fn from(e: SpecError) -> Self {
        Self::new(CliErrorCode::Rejected(e.code().code()), e.message())
    }
}

impl From<RepositoryError> for CliError {
    fn from(e: RepositoryError) -> Self {
        Self::new(CliErrorCode::Rejected(e.code()), e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
