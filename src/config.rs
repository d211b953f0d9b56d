//! Engine configuration
//!
//! Loaded from a TOML file; every section and key is optional and falls
//! back to its default.
//!
//! ```toml
//! log_filter = "queryspec=debug"
//!
//! [pagination]
//! default_page_size = 20
//! max_page_size = 500
//!
//! [execution]
//! binding_limit = 10000
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::DEFAULT_BINDING_LIMIT;
use crate::observability::Event;

/// Default page size when a request does not name one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: usize = 1000;

/// Configuration error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    ReadFailed,
    ParseFailed,
    Invalid,
}

impl ConfigErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigErrorCode::ReadFailed => "CONFIG_READ_FAILED",
            ConfigErrorCode::ParseFailed => "CONFIG_PARSE_FAILED",
            ConfigErrorCode::Invalid => "CONFIG_INVALID",
        }
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Configuration error
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn read_failed(path: &Path, reason: impl fmt::Display) -> Self {
        Self {
            code: ConfigErrorCode::ReadFailed,
            message: format!("Failed to read config '{}': {}", path.display(), reason),
        }
    }

    pub fn parse_failed(reason: impl fmt::Display) -> Self {
        Self {
            code: ConfigErrorCode::ParseFailed,
            message: format!("Invalid config TOML: {}", reason),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::Invalid,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> ConfigErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Page size defaults and limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Reference executor limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum join bindings a single document may expand into
    pub binding_limit: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            binding_limit: DEFAULT_BINDING_LIMIT,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pagination: PaginationConfig,
    pub execution: ExecutionConfig,
    /// `tracing-subscriber` env-filter directive
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            execution: ExecutionConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads and validates a TOML config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_failed(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(
            event = %Event::ConfigLoaded,
            path = %path.display(),
            default_page_size = config.pagination.default_page_size,
            max_page_size = config.pagination.max_page_size,
            "config loaded"
        );
        Ok(config)
    }

    /// Parses and validates TOML text
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(ConfigError::parse_failed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let pagination = &self.pagination;
        if pagination.default_page_size == 0 {
            return Err(ConfigError::invalid("default_page_size must be > 0"));
        }
        if pagination.max_page_size == 0 {
            return Err(ConfigError::invalid("max_page_size must be > 0"));
        }
        if pagination.default_page_size > pagination.max_page_size {
            return Err(ConfigError::invalid(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                pagination.default_page_size, pagination.max_page_size
            )));
        }
        if self.execution.binding_limit == 0 {
            return Err(ConfigError::invalid("binding_limit must be > 0"));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::invalid("log_filter must not be empty"));
        }
        Ok(())
    }
}
