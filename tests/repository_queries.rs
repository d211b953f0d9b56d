//! Repository Query Tests
//!
//! Conditions run end to end through `InMemoryRepository` and
//! `EntityService`:
//! - Join kinds decide whether unmatched documents survive
//! - Three-valued logic: NULL never satisfies a comparison or its negation
//! - Rows repeat per satisfying binding unless distinct
//! - Pagination, sorting, counting and aggregation

use queryspec::config::{EngineConfig, ExecutionConfig};
use queryspec::repository::{
    AggregationField, EntityService, FilterTranslator, InMemoryRepository, PageRequest,
    SortField, SpecificationExecutor,
};
use queryspec::spec::{Conditions, JoinKind, QueryCondition};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn posts() -> InMemoryRepository {
    InMemoryRepository::new("posts").with_documents(vec![
        json!({
            "id": 1, "title": "Ownership in Rust", "status": "published", "views": 120,
            "published_at": "2024-01-10T08:00:00Z",
            "author": {"name": "ann", "country": "NO"},
            "tags": ["rust", "memory"],
            "comments": [
                {"body": "clear", "approved": true, "user": {"name": "bob"}},
                {"body": "thanks", "approved": true, "user": {"name": "cid"}}
            ]
        }),
        json!({
            "id": 2, "title": "Draft: traits", "status": "draft", "views": 0,
            "published_at": null,
            "author": {"name": "bob", "country": "SE"},
            "tags": [],
            "comments": []
        }),
        json!({
            "id": 3, "title": "Async 100% explained", "status": "published", "views": 300,
            "published_at": "2024-03-02T12:30:00Z",
            "author": {"name": "cid"},
            "tags": ["rust", "async", "tokio"],
            "comments": [{"body": "spam", "approved": false, "user": {"name": "bob"}}]
        }),
        json!({
            "id": 4, "title": "Lifetimes", "status": "archived", "views": 45,
            "published_at": "2023-11-20T09:15:00Z",
            "author": null,
            "tags": ["rust"]
        }),
    ])
}

fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().filter_map(|row| row["id"].as_i64()).collect()
}

fn find(condition: &QueryCondition) -> Vec<i64> {
    ids(&posts().find_all(condition).unwrap())
}

// =============================================================================
// Root Filter Tests
// =============================================================================

/// Ordering comparisons on numbers and timestamps.
#[test]
fn test_numeric_and_temporal_ranges() {
    let mut condition = QueryCondition::new();
    condition.add_between("views", 40, 200);
    assert_eq!(find(&condition), vec![1, 4]);

    let mut condition = QueryCondition::new();
    condition.add_greater_than_date("published_at", "2024-01-01");
    assert_eq!(find(&condition), vec![1, 3]);
}

/// NULL satisfies neither a comparison nor its negation.
#[test]
fn test_null_is_unknown() {
    let mut equal = QueryCondition::new();
    equal.add_equal("author.country", "NO");
    let mut not_equal = QueryCondition::new();
    not_equal.add_not_equal("author.country", "NO");

    assert_eq!(find(&equal), vec![1]);
    assert_eq!(find(&not_equal), vec![2]);

    let mut missing = QueryCondition::new();
    missing.add_null("author.country");
    assert_eq!(find(&missing), vec![3, 4]);
}

/// LIKE patterns, including a `%` inside the value.
#[test]
fn test_like_patterns() {
    let mut condition = QueryCondition::new();
    condition.add_starts_with_ignore_case("title", "draft:");
    assert_eq!(find(&condition), vec![2]);

    let mut condition = QueryCondition::new();
    condition.add_contains("title", "100%");
    assert_eq!(find(&condition), vec![3]);

    let mut condition = QueryCondition::new();
    condition.add_not_contains_ignore_case("title", "RUST");
    assert_eq!(find(&condition), vec![2, 3, 4]);
}

/// Size operators count collection elements; a missing collection is empty.
#[test]
fn test_collection_size() {
    let mut condition = QueryCondition::new();
    condition.add_size_greater_equals("tags", 2);
    assert_eq!(find(&condition), vec![1, 3]);

    let mut condition = QueryCondition::new();
    condition.add_is_empty("comments");
    assert_eq!(find(&condition), vec![2, 4]);
}

/// IN and NOT IN over scalar lists.
#[test]
fn test_in_lists() {
    let mut condition = QueryCondition::new();
    condition.add_in("status", ["draft", "archived"]);
    assert_eq!(find(&condition), vec![2, 4]);

    let mut condition = QueryCondition::new();
    condition.add_not_in("id", [1, 2]);
    assert_eq!(find(&condition), vec![3, 4]);
}

// =============================================================================
// Join Tests
// =============================================================================

/// INNER drops documents with no related rows, LEFT keeps them.
#[test]
fn test_inner_and_left_joins() {
    let mut inner = QueryCondition::new().with_distinct(true);
    inner.add_join_with("comments", JoinKind::Inner).unwrap();
    assert_eq!(find(&inner), vec![1, 3]);

    let mut left = QueryCondition::new().with_distinct(true);
    left.add_join_with("comments", JoinKind::Left).unwrap();
    assert_eq!(find(&left), vec![1, 2, 3, 4]);
}

/// Without distinct a document repeats once per satisfying binding.
#[test]
fn test_rows_repeat_per_binding() {
    let mut condition = QueryCondition::new();
    condition
        .add_join_with("comments", JoinKind::Inner)
        .unwrap()
        .add_equal("approved", true);

    assert_eq!(find(&condition), vec![1, 1]);
    assert_eq!(find(&condition.clone().with_distinct(true)), vec![1]);
}

/// Nested join filters apply to the nested relation.
#[test]
fn test_nested_join_filter() {
    let mut condition = QueryCondition::new().with_distinct(true);
    condition
        .add_join("comments.user")
        .unwrap()
        .descendant_mut("user")
        .unwrap()
        .add_equal("name", "bob");

    assert_eq!(find(&condition), vec![1, 3]);
}

/// Count follows the row semantics: per binding, or per document if distinct.
#[test]
fn test_count_through_join() {
    let repo = posts();
    let mut condition = QueryCondition::new();
    condition
        .add_join_with("comments", JoinKind::Inner)
        .unwrap()
        .add_not_null("body");

    assert_eq!(repo.count(&condition).unwrap(), 3);
    assert_eq!(repo.count(&condition.with_distinct(true)).unwrap(), 2);
}

/// A document expanding past the binding limit fails the query.
#[test]
fn test_binding_limit() {
    let config = EngineConfig {
        execution: ExecutionConfig { binding_limit: 2 },
        ..EngineConfig::default()
    };
    let repo = InMemoryRepository::with_config("posts", &config)
        .with_documents(posts().documents().to_vec());

    let mut condition = QueryCondition::new();
    condition.add_joins(["comments", "tags"]).unwrap();

    let err = repo.find_all(&condition).unwrap_err();
    assert_eq!(err.code(), "EXEC_BINDING_LIMIT");
}

// =============================================================================
// Pagination And Aggregation Tests
// =============================================================================

/// Pages are cut after sorting.
#[test]
fn test_sorted_pages() {
    let repo = posts();
    let request = PageRequest::of(0, 3).with_sort_fields(vec![SortField::desc("views")]);

    let first = repo.find_page(&QueryCondition::new(), Some(&request)).unwrap();
    assert_eq!(ids(&first.content), vec![3, 1, 4]);
    assert_eq!(first.total_pages, 2);
    assert!(first.has_next());

    let second = repo
        .find_page(&QueryCondition::new(), Some(&request.next_page()))
        .unwrap();
    assert_eq!(ids(&second.content), vec![2]);
    assert!(second.is_last());
}

/// Zero-size pages are rejected.
#[test]
fn test_invalid_page_size() {
    let err = posts()
        .find_page(&QueryCondition::new(), Some(&PageRequest::of(0, 0)))
        .unwrap_err();
    assert_eq!(err.code(), "REPO_INVALID_PAGE");
}

/// Aggregates over the matching rows.
#[test]
fn test_aggregate_published() {
    let mut condition = QueryCondition::new();
    condition.add_equal("status", "published");

    let row = posts()
        .aggregate(
            &condition,
            &[
                AggregationField::count(),
                AggregationField::sum("views"),
                AggregationField::min("published_at").with_alias("first"),
            ],
        )
        .unwrap();
    assert_eq!(
        Value::Object(row),
        json!({"count": 2, "sum": 420, "first": "2024-01-10T08:00:00Z"})
    );
}

// =============================================================================
// Entity Service Tests
// =============================================================================

struct PostFilter {
    status: Option<&'static str>,
    min_views: Option<i64>,
}

struct PostFilterTranslator;

impl FilterTranslator for PostFilterTranslator {
    type Filter = PostFilter;

    fn generate_report(&self, filter: &PostFilter) -> QueryCondition {
        let mut condition = QueryCondition::new().with_distinct(true);
        condition
            .add_equal("status", filter.status)
            .add_greater_equals("views", filter.min_views);
        condition
    }
}

/// Unset filter fields are no restriction.
#[test]
fn test_filter_translator_with_unset_fields() {
    let service = EntityService::new(posts());
    let filter = PostFilter {
        status: None,
        min_views: Some(100),
    };

    let page = service
        .find_filtered(&PostFilterTranslator, &filter, None)
        .unwrap();
    assert_eq!(ids(&page.content), vec![1, 3]);

    let everything = PostFilter {
        status: None,
        min_views: None,
    };
    assert_eq!(
        service
            .count_filtered(&PostFilterTranslator, &everything)
            .unwrap(),
        4
    );
}

/// Lookups by id report missing and invalid ids distinctly.
#[test]
fn test_find_by_id_errors() {
    let service = EntityService::new(posts());

    assert_eq!(service.find_by_id(3, &["comments"]).unwrap()["id"], 3);
    assert!(service.find_by_id(42, &[]).unwrap_err().is_not_found());
    assert_eq!(
        service.find_by_id(None::<i64>, &[]).unwrap_err().code(),
        "REPO_INVALID_IDENTIFIER"
    );
}

/// Search looks across fields, ignoring case.
#[test]
fn test_search_across_fields() {
    let service = EntityService::new(posts());
    let rows = service
        .search("CID", &["author.name", "title"], None)
        .unwrap();
    assert_eq!(ids(&rows), vec![3]);
}

/// A custom id field is honored.
#[test]
fn test_custom_id_field() {
    let repo = InMemoryRepository::new("users")
        .with_documents(vec![json!({"uuid": "a-1"}), json!({"uuid": "b-2"})]);
    let service = EntityService::new(repo).with_id_field("uuid");

    assert!(service.find_optional_by_id("b-2", &[]).unwrap().is_some());
    assert_eq!(
        service.find_ids(&QueryCondition::new()).unwrap(),
        vec![json!("a-1"), json!("b-2")]
    );
}
