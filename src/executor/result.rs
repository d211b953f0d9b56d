//! Result types for query execution

use serde::Serialize;
use serde_json::Value;

/// Result of query execution
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionResult {
    /// Matching documents, in input order, repeated per satisfying binding
    /// unless the spec is distinct
    pub documents: Vec<Value>,
    /// Number of documents scanned
    pub scanned_count: usize,
    /// Number of join bindings evaluated
    pub bindings_evaluated: usize,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no documents matched
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns an iterator over the documents
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.documents.iter()
    }

    pub fn into_documents(self) -> Vec<Value> {
        self.documents
    }
}
