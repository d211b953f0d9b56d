//! Query specification model
//!
//! The declarative side of the engine: what to filter, which relations to
//! traverse, and how the result is shaped. Values built here are
//! build-once, read-many trees handed to the compiler.
//!
//! # Structure
//!
//! - `QueryCondition` owns one root `FilterGroup` and a `JoinSet`
//! - `FilterGroup` ANDs its parameters and ORs its optional OR group
//! - `JoinSpec` carries a join kind, a fetch flag, its own filter group
//!   and a `JoinSet` of children
//! - `JoinSet` deduplicates siblings on `(key, kind)` and merges children

mod builder;
mod condition;
mod errors;
mod filter;
mod join;
mod operator;
mod parameter;
mod value;

pub use builder::Conditions;
pub use condition::QueryCondition;
pub use errors::{SpecError, SpecErrorCode, SpecResult};
pub use filter::FilterGroup;
pub use join::{JoinKey, JoinKind, JoinSet, JoinSpec};
pub use operator::{Operator, ValueShape};
pub use parameter::{split_path, ConditionParameter};
pub use value::{parse_timestamp, ConditionValue};
