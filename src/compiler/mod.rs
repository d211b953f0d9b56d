//! Specification compiler
//!
//! Compiles the declarative `QueryCondition` into a backend-neutral
//! `CompiledSpec`: a predicate tree plus the traversals it references.
//!
//! # Properties
//!
//! - Pure: same condition, same output; no state between calls
//! - Total: every operator has exactly one compiled comparison, checked
//!   by an exhaustive match
//! - Soft nulls: a null value on an operator that needs one contributes
//!   nothing, so an empty group compiles to `Predicate::Always`

mod compiler;
mod explain;
mod predicate;

pub use compiler::{ResultShape, SpecCompiler};
pub use explain::ExplainPlan;
pub use predicate::{
    AttributeRef, Comparison, CompiledSpec, JoinId, Operand, Predicate, Source, Traversal,
    TraversalMode,
};
