//! queryspec - declarative query conditions compiled to a backend-neutral
//! predicate IR
//!
//! - `spec`: conditions, filter groups and join trees
//! - `compiler`: `QueryCondition` to `CompiledSpec`
//! - `executor`: reference evaluation over JSON documents
//! - `repository`: pagination, aggregation and the entity service façade

pub mod cli;
pub mod compiler;
pub mod config;
pub mod executor;
pub mod observability;
pub mod repository;
pub mod spec;
