//! Repository errors
//!
//! Error codes:
//! - REPO_INVALID_IDENTIFIER: null id where one is required
//! - REPO_NOT_FOUND: a single-entity lookup matched nothing
//! - REPO_INVALID_PAGE: page request outside the configured limits
//! - REPO_INVALID_AGGREGATE: aggregate over values it cannot combine
//! - REPO_INVALID_DOCUMENTS: documents that are not JSON
//! - SPEC_* / EXEC_*: compilation and execution errors, passed through

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::spec::SpecError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Lookup by id with a null id
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// No entity matched a lookup that expects exactly one
    #[error("Entity not found: {entity} with {criteria}")]
    NotFound { entity: String, criteria: String },

    /// Page number or size out of range
    #[error("Invalid page request: {0}")]
    InvalidPage(String),

    /// Aggregation over values that cannot be combined
    #[error("Invalid aggregate: {0}")]
    InvalidAggregate(String),

    /// Store contents could not be read
    #[error("Invalid documents: {0}")]
    InvalidDocuments(String),

    /// Condition rejected by the compiler
    #[error("{0}")]
    Spec(#[from] SpecError),

    /// Execution failure
    #[error("{0}")]
    Execution(#[from] ExecutorError),
}

impl RepositoryError {
    pub fn not_found(entity: impl Into<String>, criteria: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity: entity.into(),
            criteria: criteria.into(),
        }
    }

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::InvalidIdentifier(_) => "REPO_INVALID_IDENTIFIER",
            RepositoryError::NotFound { .. } => "REPO_NOT_FOUND",
            RepositoryError::InvalidPage(_) => "REPO_INVALID_PAGE",
            RepositoryError::InvalidAggregate(_) => "REPO_INVALID_AGGREGATE",
            RepositoryError::InvalidDocuments(_) => "REPO_INVALID_DOCUMENTS",
            RepositoryError::Spec(err) => err.code().code(),
            RepositoryError::Execution(err) => err.code().code(),
        }
    }

    /// True for the "exactly one expected, none found" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}
