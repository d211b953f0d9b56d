//! Reference executor
//!
//! Evaluates compiled specs against in-memory JSON documents. Used by the
//! in-memory repository and the CLI, and as the behavioral reference for
//! the predicate IR.
//!
//! # Semantics
//!
//! - Relationship attributes holding arrays fan out into one row per element
//! - INNER/RIGHT joins drop documents with no related rows; LEFT/FULL keep
//!   them with a NULL row
//! - SQL three-valued logic; only TRUE selects
//! - Without `distinct`, a document is returned once per satisfying binding

mod bindings;
mod errors;
mod evaluator;
mod executor;
mod result;
mod sorter;
mod truth;
mod values;

pub use bindings::{enumerate as enumerate_bindings, Binding};
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use evaluator::PredicateEvaluator;
pub use executor::{QueryExecutor, DEFAULT_BINDING_LIMIT};
pub use result::ExecutionResult;
pub use sorter::{ResultSorter, SortDirection, SortField};
pub use truth::Truth;
pub use values::{compare_values, resolve_path, sort_order};
