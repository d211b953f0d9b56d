//! Specification execution
//!
//! `SpecificationExecutor` is the seam between conditions and a store:
//! it accepts a `QueryCondition` and answers with rows, a page, a count,
//! an existence flag or an aggregate row. `InMemoryRepository` is the
//! reference implementation over JSON documents.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::aggregate::{aggregate, AggregationField};
use super::errors::{RepositoryError, RepositoryResult};
use super::page::{Page, PageRequest, Paginator};
use crate::compiler::{CompiledSpec, ResultShape, SpecCompiler};
use crate::config::EngineConfig;
use crate::executor::{QueryExecutor, ResultSorter, SortField};
use crate::observability::{Event, MetricsRegistry};
use crate::spec::QueryCondition;

/// Executes query conditions against a store
pub trait SpecificationExecutor {
    /// Entity name, used in error messages
    fn entity_name(&self) -> &str;

    /// All matching rows, in store order
    fn find_all(&self, condition: &QueryCondition) -> RepositoryResult<Vec<Value>>;

    /// All matching rows, sorted
    fn find_all_sorted(
        &self,
        condition: &QueryCondition,
        sort: &[SortField],
    ) -> RepositoryResult<Vec<Value>> {
        let mut rows = self.find_all(condition)?;
        ResultSorter::sort(&mut rows, sort);
        Ok(rows)
    }

    /// One page of matching rows; `None` requests the default first page
    fn find_page(
        &self,
        condition: &QueryCondition,
        request: Option<&PageRequest>,
    ) -> RepositoryResult<Page<Value>>;

    /// Number of matching rows
    fn count(&self, condition: &QueryCondition) -> RepositoryResult<u64>;

    fn exists(&self, condition: &QueryCondition) -> RepositoryResult<bool> {
        Ok(self.count(condition)? > 0)
    }

    /// One row of aggregates over the matching rows
    fn aggregate(
        &self,
        condition: &QueryCondition,
        fields: &[AggregationField],
    ) -> RepositoryResult<Map<String, Value>>;

    /// Counters for this store, if it keeps any
    fn metrics(&self) -> Option<&MetricsRegistry> {
        None
    }
}

/// Reference store over in-memory JSON documents
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    entity: String,
    documents: Vec<Value>,
    executor: QueryExecutor,
    paginator: Paginator,
    metrics: Arc<MetricsRegistry>,
}

impl InMemoryRepository {
    /// Create an empty repository with default configuration
    pub fn new(entity: impl Into<String>) -> Self {
        Self::with_config(entity, &EngineConfig::default())
    }

    /// Create an empty repository with the given configuration
    pub fn with_config(entity: impl Into<String>, config: &EngineConfig) -> Self {
        Self {
            entity: entity.into(),
            documents: Vec::new(),
            executor: QueryExecutor::new().with_binding_limit(config.execution.binding_limit),
            paginator: Paginator::new(config.pagination),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_documents(mut self, documents: impl IntoIterator<Item = Value>) -> Self {
        self.documents.extend(documents);
        self
    }

    /// Loads documents from a JSON array
    pub fn load_json(mut self, json: &str) -> RepositoryResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| RepositoryError::InvalidDocuments(e.to_string()))?;
        match value {
            Value::Array(items) => self.documents.extend(items),
            other => self.documents.push(other),
        }
        Ok(self)
    }

    pub fn insert(&mut self, document: Value) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    /// Shared handle on this repository's counters
    pub fn metrics_handle(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    fn compile(
        &self,
        condition: &QueryCondition,
        shape: ResultShape,
    ) -> RepositoryResult<CompiledSpec> {
        match SpecCompiler::compile_for(condition, shape) {
            Ok(spec) => {
                self.metrics.increment_conditions_compiled();
                self.metrics.add_parameters_skipped(spec.skipped_parameters as u64);
                Ok(spec)
            }
            Err(err) => {
                self.metrics.increment_compilations_rejected();
                Err(err.into())
            }
        }
    }

    fn run(&self, condition: &QueryCondition, shape: ResultShape) -> RepositoryResult<Vec<Value>> {
        let spec = self.compile(condition, shape)?;
        let result = self.executor.execute(&spec, &self.documents).map_err(|err| {
            warn!(
                event = %Event::RequestRejected,
                entity = %self.entity,
                code = %err.code(),
                "{}",
                err.message()
            );
            err
        })?;

        self.metrics.increment_queries_executed();
        self.metrics.add_rows_returned(result.len() as u64);
        debug!(
            event = %Event::QueryExecuted,
            entity = %self.entity,
            scanned = result.scanned_count,
            bindings = result.bindings_evaluated,
            rows = result.len(),
            "query executed"
        );
        Ok(result.into_documents())
    }
}

impl SpecificationExecutor for InMemoryRepository {
    fn entity_name(&self) -> &str {
        &self.entity
    }

    fn find_all(&self, condition: &QueryCondition) -> RepositoryResult<Vec<Value>> {
        self.run(condition, ResultShape::Entity)
    }

    fn find_page(
        &self,
        condition: &QueryCondition,
        request: Option<&PageRequest>,
    ) -> RepositoryResult<Page<Value>> {
        let request = self.paginator.resolve(request)?;
        let rows = self.find_all_sorted(condition, &request.sort_keys())?;
        Ok(self.paginator.page(rows, &request))
    }

    fn count(&self, condition: &QueryCondition) -> RepositoryResult<u64> {
        Ok(self.run(condition, ResultShape::Scalar)?.len() as u64)
    }

    fn aggregate(
        &self,
        condition: &QueryCondition,
        fields: &[AggregationField],
    ) -> RepositoryResult<Map<String, Value>> {
        let rows = self.run(condition, ResultShape::Scalar)?;
        aggregate(&rows, fields)
    }

    fn metrics(&self) -> Option<&MetricsRegistry> {
        Some(&self.metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::spec::Conditions;
    use serde_json::json;

    fn repository() -> InMemoryRepository {
        InMemoryRepository::new("users").with_documents(vec![
            json!({"id": 1, "name": "ann", "age": 31, "roles": ["admin"]}),
            json!({"id": 2, "name": "bob", "age": 17, "roles": []}),
            json!({"id": 3, "name": "cid", "age": 45, "roles": ["dev", "ops"]}),
        ])
    }

    fn ids(rows: &[Value]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[test]
    fn test_find_all() {
        let repo = repository();
        let mut condition = QueryCondition::new();
        condition.add_greater_equals("age", 18);

        assert_eq!(ids(&repo.find_all(&condition).unwrap()), vec![1, 3]);
    }

    #[test]
    fn test_find_all_sorted() {
        let repo = repository();
        let rows = repo
            .find_all_sorted(&QueryCondition::new(), &[SortField::desc("age")])
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 1, 2]);
    }

    #[test]
    fn test_find_page() {
        let repo = repository();
        let request = PageRequest::sorted(1, 2, "age", "asc");
        let page = repo.find_page(&QueryCondition::new(), Some(&request)).unwrap();
        assert_eq!(ids(&page.content), vec![3]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_find_page_uses_configured_default() {
        let config = EngineConfig {
            pagination: PaginationConfig {
                default_page_size: 2,
                max_page_size: 5,
            },
            ..EngineConfig::default()
        };
        let repo = InMemoryRepository::with_config("users", &config)
            .with_documents(repository().documents().to_vec());

        let page = repo.find_page(&QueryCondition::new(), None).unwrap();
        assert_eq!(page.content.len(), 2);

        let err = repo
            .find_page(&QueryCondition::new(), Some(&PageRequest::of(0, 6)))
            .unwrap_err();
        assert_eq!(err.code(), "REPO_INVALID_PAGE");
    }

    #[test]
    fn test_count_and_exists() {
        let repo = repository();
        let mut condition = QueryCondition::new();
        condition.add_size_greater_equals("roles", 1);

        assert_eq!(repo.count(&condition).unwrap(), 2);
        assert!(repo.exists(&condition).unwrap());

        let mut none = QueryCondition::new();
        none.add_equal("name", "zed");
        assert!(!repo.exists(&none).unwrap());
    }

    #[test]
    fn test_aggregate() {
        let repo = repository();
        let row = repo
            .aggregate(
                &QueryCondition::new(),
                &[AggregationField::count(), AggregationField::max("age")],
            )
            .unwrap();
        assert_eq!(Value::Object(row), json!({"count": 3, "max": 45}));
    }

    #[test]
    fn test_metrics_recorded() {
        let repo = repository();
        let mut condition = QueryCondition::new();
        condition.add_equal("name", None::<String>).add_equal("id", 1);
        repo.find_all(&condition).unwrap();

        let mut bad = QueryCondition::new();
        bad.add_greater_than("age", "old");
        assert!(repo.find_all(&bad).is_err());

        let snapshot = repo.metrics().unwrap().snapshot();
        assert_eq!(snapshot.conditions_compiled, 1);
        assert_eq!(snapshot.compilations_rejected, 1);
        assert_eq!(snapshot.parameters_skipped, 1);
        assert_eq!(snapshot.queries_executed, 1);
        assert_eq!(snapshot.rows_returned, 1);
    }

    #[test]
    fn test_load_json() {
        let repo = InMemoryRepository::new("users")
            .load_json(r#"[{"id": 1}, {"id": 2}]"#)
            .unwrap();
        assert_eq!(repo.len(), 2);
    }
}
