//! Entity service
//!
//! The common query shapes every entity service needs, written once over
//! any `SpecificationExecutor`: lookups by id, equality lookups, filtered
//! lists and pages, counts, existence checks and free-text search.
//!
//! Call sites that accept an external filter object supply a
//! `FilterTranslator` that turns it into a `QueryCondition`.

use serde_json::Value;
use tracing::warn;

use super::errors::{RepositoryError, RepositoryResult};
use super::memory::SpecificationExecutor;
use super::page::{Page, PageRequest};
use crate::observability::Event;
use crate::spec::{ConditionValue, Conditions, JoinSpec, QueryCondition};

/// Default identifier attribute
pub const DEFAULT_ID_FIELD: &str = "id";

/// Turns a caller-facing filter object into a query condition
pub trait FilterTranslator {
    type Filter;

    fn generate_report(&self, filter: &Self::Filter) -> QueryCondition;
}

/// Generic query façade over a repository
#[derive(Debug, Clone)]
pub struct EntityService<R> {
    repository: R,
    id_field: String,
}

impl<R: SpecificationExecutor> EntityService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Entity with the given id, loading `joins`.
    ///
    /// A null id is `REPO_INVALID_IDENTIFIER`; no match is `REPO_NOT_FOUND`.
    pub fn find_by_id(
        &self,
        id: impl Into<ConditionValue>,
        joins: &[&str],
    ) -> RepositoryResult<Value> {
        let id = id.into();
        if id.is_null() {
            return Err(RepositoryError::InvalidIdentifier(format!(
                "{} must not be null",
                self.id_field
            )));
        }
        let criteria = format!("{} = {}", self.id_field, id);
        match self.lookup_by_id(id, joins)? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found(criteria)),
        }
    }

    /// Entity with the given id, or `None` for a null id or no match
    pub fn find_optional_by_id(
        &self,
        id: impl Into<ConditionValue>,
        joins: &[&str],
    ) -> RepositoryResult<Option<Value>> {
        let id = id.into();
        if id.is_null() {
            return Ok(None);
        }
        self.lookup_by_id(id, joins)
    }

    fn lookup_by_id(&self, id: ConditionValue, joins: &[&str]) -> RepositoryResult<Option<Value>> {
        let mut condition = QueryCondition::new();
        condition.add_equal(self.id_field.as_str(), id);
        condition.add_joins(joins.iter().copied())?;
        Ok(self.repository.find_all(&condition)?.into_iter().next())
    }

    /// Entity with the given id, restricted by prebuilt `joins`.
    ///
    /// Unlike `find_by_id`, the joins keep their own kind, filter and fetch
    /// flag, so an INNER or filtered join can exclude the entity.
    pub fn find_by_id_with(
        &self,
        id: impl Into<ConditionValue>,
        joins: impl IntoIterator<Item = JoinSpec>,
    ) -> RepositoryResult<Value> {
        let id = id.into();
        if id.is_null() {
            return Err(RepositoryError::InvalidIdentifier(format!(
                "{} must not be null",
                self.id_field
            )));
        }
        let criteria = format!("{} = {}", self.id_field, id);
        let mut condition = QueryCondition::new();
        condition.add_equal(self.id_field.as_str(), id);
        add_join_specs(&mut condition, joins);
        match self.repository.find_all(&condition)?.into_iter().next() {
            Some(entity) => Ok(entity),
            None => Err(self.not_found(criteria)),
        }
    }

    /// Entities whose id is in `ids`
    pub fn find_all_by_ids<V: Into<ConditionValue>>(
        &self,
        ids: impl IntoIterator<Item = V>,
        joins: &[&str],
    ) -> RepositoryResult<Vec<Value>> {
        let mut condition = QueryCondition::new();
        condition.add_in(self.id_field.as_str(), ids);
        condition.add_joins(joins.iter().copied())?;
        self.repository.find_all(&condition)
    }

    /// First row of the first page of size one
    pub fn find_first(&self, condition: &QueryCondition) -> RepositoryResult<Option<Value>> {
        let page = self
            .repository
            .find_page(condition, Some(&PageRequest::of(0, 1)))?;
        Ok(page.content.into_iter().next())
    }

    /// Rows of the requested page, loading `joins`
    pub fn find_all(
        &self,
        condition: &QueryCondition,
        request: Option<&PageRequest>,
        joins: &[&str],
    ) -> RepositoryResult<Vec<Value>> {
        Ok(self.find_page(condition, request, joins)?.content)
    }

    /// The requested page, loading `joins`
    pub fn find_page(
        &self,
        condition: &QueryCondition,
        request: Option<&PageRequest>,
        joins: &[&str],
    ) -> RepositoryResult<Page<Value>> {
        let condition = with_joins(condition, joins)?;
        self.repository.find_page(&condition, request)
    }

    /// Ids of the matching rows; joins are never fetched
    pub fn find_ids(&self, condition: &QueryCondition) -> RepositoryResult<Vec<Value>> {
        let condition = condition.clone().with_suppress_fetch(true);
        let rows = self.repository.find_all(&condition)?;
        Ok(rows
            .iter()
            .map(|row| row.get(&self.id_field).cloned().unwrap_or(Value::Null))
            .collect())
    }

    pub fn count(&self, condition: &QueryCondition) -> RepositoryResult<u64> {
        self.repository.count(condition)
    }

    pub fn exists(&self, condition: &QueryCondition) -> RepositoryResult<bool> {
        self.repository.exists(condition)
    }

    /// True if a row matches every `(path, value)` equality
    pub fn exists_by_equal<K, V>(
        &self,
        equalities: impl IntoIterator<Item = (K, V)>,
    ) -> RepositoryResult<bool>
    where
        K: Into<String>,
        V: Into<ConditionValue>,
    {
        self.exists(&equal_condition(equalities))
    }

    /// Rows matching every `(path, value)` equality, loading `joins`
    pub fn list_by_equal<K, V>(
        &self,
        equalities: impl IntoIterator<Item = (K, V)>,
        joins: &[&str],
    ) -> RepositoryResult<Vec<Value>>
    where
        K: Into<String>,
        V: Into<ConditionValue>,
    {
        let mut condition = equal_condition(equalities);
        condition.add_joins(joins.iter().copied())?;
        self.repository.find_all(&condition)
    }

    /// Rows matching every `(path, value)` equality, restricted by `joins`
    pub fn list_by_equal_with<K, V>(
        &self,
        equalities: impl IntoIterator<Item = (K, V)>,
        joins: impl IntoIterator<Item = JoinSpec>,
    ) -> RepositoryResult<Vec<Value>>
    where
        K: Into<String>,
        V: Into<ConditionValue>,
    {
        let mut condition = equal_condition(equalities);
        add_join_specs(&mut condition, joins);
        self.repository.find_all(&condition)
    }

    /// Single row matching every `(path, value)` equality, restricted by `joins`
    pub fn find_one_by_equal_with<K, V>(
        &self,
        equalities: impl IntoIterator<Item = (K, V)>,
        joins: impl IntoIterator<Item = JoinSpec>,
    ) -> RepositoryResult<Value>
    where
        K: Into<String>,
        V: Into<ConditionValue>,
    {
        self.find_one_by_condition_with(&equal_condition(equalities), joins)
    }

    /// Rows matching `condition` with `joins` merged into it
    pub fn list_by_condition_with(
        &self,
        condition: &QueryCondition,
        joins: impl IntoIterator<Item = JoinSpec>,
    ) -> RepositoryResult<Vec<Value>> {
        let mut condition = condition.clone();
        add_join_specs(&mut condition, joins);
        self.repository.find_all(&condition)
    }

    /// First row matching `condition` with `joins` merged into it.
    ///
    /// No match is `REPO_NOT_FOUND`.
    pub fn find_one_by_condition_with(
        &self,
        condition: &QueryCondition,
        joins: impl IntoIterator<Item = JoinSpec>,
    ) -> RepositoryResult<Value> {
        match self.list_by_condition_with(condition, joins)?.into_iter().next() {
            Some(entity) => Ok(entity),
            None => {
                let criteria = serde_json::to_string(condition.filter()).unwrap_or_default();
                Err(self.not_found(criteria))
            }
        }
    }

    /// Rows where any of `fields` contains `text`, ignoring case
    pub fn search(
        &self,
        text: &str,
        fields: &[&str],
        request: Option<&PageRequest>,
    ) -> RepositoryResult<Vec<Value>> {
        Ok(self.search_page(text, fields, request)?.content)
    }

    pub fn search_page(
        &self,
        text: &str,
        fields: &[&str],
        request: Option<&PageRequest>,
    ) -> RepositoryResult<Page<Value>> {
        let mut condition = QueryCondition::new();
        let or_group = condition.or_group_mut();
        for field in fields {
            or_group.add_contains_ignore_case(*field, text);
        }
        self.repository.find_page(&condition, request)
    }

    /// Rows matching a translated filter object
    pub fn find_filtered<T: FilterTranslator>(
        &self,
        translator: &T,
        filter: &T::Filter,
        request: Option<&PageRequest>,
    ) -> RepositoryResult<Page<Value>> {
        let condition = translator.generate_report(filter);
        self.repository.find_page(&condition, request)
    }

    pub fn count_filtered<T: FilterTranslator>(
        &self,
        translator: &T,
        filter: &T::Filter,
    ) -> RepositoryResult<u64> {
        self.repository.count(&translator.generate_report(filter))
    }

    fn not_found(&self, criteria: String) -> RepositoryError {
        let entity = self.repository.entity_name();
        if let Some(metrics) = self.repository.metrics() {
            metrics.increment_entities_not_found();
        }
        warn!(event = %Event::EntityNotFound, entity = %entity, criteria = %criteria, "entity not found");
        RepositoryError::not_found(entity, criteria)
    }
}

fn with_joins(condition: &QueryCondition, joins: &[&str]) -> RepositoryResult<QueryCondition> {
    let mut condition = condition.clone();
    condition.add_joins(joins.iter().copied())?;
    Ok(condition)
}

fn add_join_specs(condition: &mut QueryCondition, joins: impl IntoIterator<Item = JoinSpec>) {
    for join in joins {
        condition.add_join_spec(join);
    }
}

fn equal_condition<K, V>(equalities: impl IntoIterator<Item = (K, V)>) -> QueryCondition
where
    K: Into<String>,
    V: Into<ConditionValue>,
{
    let mut condition = QueryCondition::new();
    for (path, value) in equalities {
        condition.add_equal(path, value);
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::spec::JoinKind;
    use serde_json::json;

    fn service() -> EntityService<InMemoryRepository> {
        let repository = InMemoryRepository::new("posts").with_documents(vec![
            json!({"id": 1, "title": "Rust ownership", "status": "published",
                   "comments": [{"body": "great"}, {"body": "thanks"}]}),
            json!({"id": 2, "title": "Borrowing rules", "status": "draft", "comments": []}),
            json!({"id": 3, "title": "Lifetimes", "status": "published",
                   "comments": [{"body": "rust is neat"}]}),
        ]);
        EntityService::new(repository)
    }

    fn ids(rows: &[Value]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    struct StatusFilter {
        status: Option<String>,
    }

    struct PostTranslator;

    impl FilterTranslator for PostTranslator {
        type Filter = StatusFilter;

        fn generate_report(&self, filter: &StatusFilter) -> QueryCondition {
            let mut condition = QueryCondition::new();
            condition.add_equal("status", filter.status.clone());
            condition
        }
    }

    #[test]
    fn test_find_by_id() {
        let service = service();
        let post = service.find_by_id(2, &[]).unwrap();
        assert_eq!(post["title"], "Borrowing rules");
    }

    #[test]
    fn test_find_by_id_with_fetch_join_returns_one() {
        let service = service();
        let post = service.find_by_id(1, &["comments"]).unwrap();
        assert_eq!(post["id"], 1);
    }

    #[test]
    fn test_find_by_null_id_is_invalid() {
        let err = service().find_by_id(None::<i64>, &[]).unwrap_err();
        assert_eq!(err.code(), "REPO_INVALID_IDENTIFIER");
    }

    #[test]
    fn test_find_by_missing_id_is_not_found() {
        let service = service();
        let err = service.find_by_id(99, &[]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            service.repository().metrics().unwrap().snapshot().entities_not_found,
            1
        );
    }

    #[test]
    fn test_find_optional_by_id() {
        let service = service();
        assert!(service.find_optional_by_id(None::<i64>, &[]).unwrap().is_none());
        assert!(service.find_optional_by_id(99, &[]).unwrap().is_none());
        assert!(service.find_optional_by_id(3, &[]).unwrap().is_some());
    }

    #[test]
    fn test_find_all_by_ids() {
        let rows = service().find_all_by_ids([1, 3], &[]).unwrap();
        assert_eq!(ids(&rows), vec![1, 3]);
    }

    #[test]
    fn test_find_first() {
        let mut condition = QueryCondition::new();
        condition.add_equal("status", "published");
        let first = service().find_first(&condition).unwrap().unwrap();
        assert_eq!(first["id"], 1);
    }

    #[test]
    fn test_find_ids_suppresses_fetch() {
        let mut condition = QueryCondition::new();
        condition.add_join("comments").unwrap();
        let found = service().find_ids(&condition.with_distinct(true)).unwrap();
        assert_eq!(found, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_equal_lookups() {
        let service = service();
        assert!(service.exists_by_equal([("status", "draft")]).unwrap());
        assert!(!service.exists_by_equal([("status", "archived")]).unwrap());

        let rows = service.list_by_equal([("status", "published")], &[]).unwrap();
        assert_eq!(ids(&rows), vec![1, 3]);
    }

    #[test]
    fn test_search_any_field_ignoring_case() {
        let rows = service().search("RUST", &["title", "status"], None).unwrap();
        assert_eq!(ids(&rows), vec![1]);
    }

    #[test]
    fn test_find_page_with_joins() {
        let service = service();
        let request = PageRequest::sorted(0, 10, "id", "desc");
        let page = service
            .find_page(&QueryCondition::new().with_distinct(true), Some(&request), &["comments"])
            .unwrap();
        assert_eq!(ids(&page.content), vec![3, 2, 1]);
    }

    #[test]
    fn test_filter_translator() {
        let service = service();
        let published = StatusFilter {
            status: Some("published".into()),
        };
        let page = service
            .find_filtered(&PostTranslator, &published, None)
            .unwrap();
        assert_eq!(ids(&page.content), vec![1, 3]);

        let unfiltered = StatusFilter { status: None };
        assert_eq!(service.count_filtered(&PostTranslator, &unfiltered).unwrap(), 3);
    }

    fn rust_comments(kind: JoinKind) -> JoinSpec {
        let mut join = JoinSpec::path("comments", kind, false).unwrap();
        join.add_contains("body", "rust");
        join
    }

    #[test]
    fn test_find_by_id_with_inner_filtered_join() {
        let service = service();
        assert_eq!(
            service
                .find_by_id_with(3, [rust_comments(JoinKind::Inner)])
                .unwrap()["id"],
            3
        );

        let err = service
            .find_by_id_with(1, [rust_comments(JoinKind::Inner)])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            service
                .find_by_id_with(None::<i64>, Vec::<JoinSpec>::new())
                .unwrap_err()
                .code(),
            "REPO_INVALID_IDENTIFIER"
        );
    }

    #[test]
    fn test_equal_and_condition_lookups_with_joins() {
        let service = service();
        let rows = service
            .list_by_equal_with([("status", "published")], [rust_comments(JoinKind::Inner)])
            .unwrap();
        assert_eq!(ids(&rows), vec![3]);

        let one = service
            .find_one_by_equal_with([("status", "published")], [rust_comments(JoinKind::Inner)])
            .unwrap();
        assert_eq!(one["id"], 3);

        let mut draft = QueryCondition::new();
        draft.add_equal("status", "draft");
        let joins = [JoinSpec::path("comments", JoinKind::Inner, false).unwrap()];
        assert!(service.list_by_condition_with(&draft, joins.clone()).unwrap().is_empty());
        assert!(service
            .find_one_by_condition_with(&draft, joins)
            .unwrap_err()
            .is_not_found());
        assert_eq!(
            ids(&service
                .list_by_condition_with(&draft, [rust_comments(JoinKind::Left)])
                .unwrap()),
            Vec::<i64>::new()
        );
    }
}
