//! Reference query executor
//!
//! Runs a compiled spec over in-memory JSON documents. For each document:
//!
//! 1. Enumerate the join bindings of its traversals
//! 2. Evaluate the predicate under each binding
//! 3. Emit the document once per TRUE binding, or once if distinct

use serde_json::Value;

use super::bindings;
use super::errors::ExecutorResult;
use super::evaluator::PredicateEvaluator;
use super::result::ExecutionResult;
use crate::compiler::CompiledSpec;

/// Default maximum number of join bindings per document
pub const DEFAULT_BINDING_LIMIT: usize = 10_000;

/// Executes compiled specs against documents
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor {
    binding_limit: usize,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self {
            binding_limit: DEFAULT_BINDING_LIMIT,
        }
    }
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding_limit(mut self, limit: usize) -> Self {
        self.binding_limit = limit.max(1);
        self
    }

    /// Executes `spec` over `documents`, preserving input order
    pub fn execute<'a, I>(&self, spec: &CompiledSpec, documents: I) -> ExecutorResult<ExecutionResult>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut evaluator = PredicateEvaluator::new();
        let mut result = ExecutionResult::empty();

        for document in documents {
            result.scanned_count += 1;
            let (evaluated, satisfied) = self.satisfied(&mut evaluator, spec, document)?;
            result.bindings_evaluated += evaluated;

            let copies = if spec.distinct {
                satisfied.min(1)
            } else {
                satisfied
            };
            for _ in 0..copies {
                result.documents.push(document.clone());
            }
        }

        Ok(result)
    }

    /// True if at least one binding of `document` satisfies `spec`
    pub fn matches(&self, spec: &CompiledSpec, document: &Value) -> ExecutorResult<bool> {
        let mut evaluator = PredicateEvaluator::new();
        let (_, satisfied) = self.satisfied(&mut evaluator, spec, document)?;
        Ok(satisfied > 0)
    }

    /// Returns (bindings evaluated, bindings satisfied)
    fn satisfied(
        &self,
        evaluator: &mut PredicateEvaluator,
        spec: &CompiledSpec,
        document: &Value,
    ) -> ExecutorResult<(usize, usize)> {
        let bindings = bindings::enumerate(document, &spec.traversals, self.binding_limit)?;
        let mut satisfied = 0;
        for binding in &bindings {
            if evaluator.evaluate(&spec.predicate, document, binding)?.is_true() {
                satisfied += 1;
            }
        }
        Ok((bindings.len(), satisfied))
    }
}
