//! Join Merge Tests
//!
//! Join nodes are identified by (key, kind):
//! - Re-adding a node merges its children into the existing one, filters
//!   on distinct children included
//! - The same key with a different kind is a separate sibling
//! - Deserialized join lists merge the same way

use queryspec::compiler::{AttributeRef, Comparison, Operand, Predicate, SpecCompiler};
use queryspec::spec::{ConditionValue, Conditions, JoinKind, JoinSet, JoinSpec, QueryCondition};

// =============================================================================
// Helper Functions
// =============================================================================

fn child_keys(spec: &JoinSpec) -> Vec<&str> {
    spec.children().iter().map(JoinSpec::key).collect()
}

fn join_eq(id: usize, path: &str, value: impl Into<ConditionValue>) -> Predicate {
    Comparison::Equal {
        operand: Operand::Attribute(AttributeRef::join(id, path)),
        value: value.into(),
    }
    .into()
}

fn user_with_child(child: &str, path: &str, value: &str) -> JoinSpec {
    let mut nested = JoinSpec::parse(child).unwrap();
    nested.add_equal(path, value);
    JoinSpec::parse("user").unwrap().with_child(nested)
}

// =============================================================================
// Merge Tests
// =============================================================================

/// Adding "user" twice with different children yields one merged node.
#[test]
fn test_repeated_join_merges_children() {
    let mut condition = QueryCondition::new();
    condition.add_join("user.address").unwrap();
    condition.add_join("user.company").unwrap();

    assert_eq!(condition.joins().len(), 1);
    let user = condition.joins().get("user", JoinKind::Left).unwrap();
    assert_eq!(child_keys(user), vec!["address", "company"]);
}

/// "user" added twice with differently filtered children keeps both filters.
#[test]
fn test_repeated_join_keeps_child_filters() {
    let mut condition = QueryCondition::new();
    condition.add_join_spec(user_with_child("address", "city", "Oslo"));
    condition.add_join_spec(user_with_child("company", "name", "Acme"));

    assert_eq!(condition.joins().len(), 1);
    let user = condition.joins().get("user", JoinKind::Left).unwrap();
    assert_eq!(child_keys(user), vec!["address", "company"]);

    let spec = SpecCompiler::compile(&condition).unwrap();
    assert_eq!(spec.traversals.len(), 3);
    // user is j0, address j1, company j2.
    assert_eq!(
        spec.predicate,
        Predicate::And(vec![join_eq(1, "city", "Oslo"), join_eq(2, "name", "Acme")])
    );
}

/// A repeated child keeps its first filter; the incoming one is dropped.
#[test]
fn test_repeated_child_drops_incoming_filter() {
    let mut condition = QueryCondition::new();
    condition.add_join_spec(user_with_child("address", "city", "Oslo"));
    condition.add_join_spec(user_with_child("address", "city", "Bergen"));

    let user = condition.joins().get("user", JoinKind::Left).unwrap();
    assert_eq!(user.node_count(), 2);

    let spec = SpecCompiler::compile(&condition).unwrap();
    assert_eq!(spec.predicate, join_eq(1, "city", "Oslo"));
}

/// The surviving node keeps the filter attached on the first call.
#[test]
fn test_merge_keeps_existing_filter() {
    let mut condition = QueryCondition::new();
    condition.add_join("user").unwrap().add_equal("active", true);
    condition
        .add_join("user.roles")
        .unwrap()
        .add_equal("name", "admin");

    let user = condition.joins().get("user", JoinKind::Left).unwrap();
    assert_eq!(user.filter().parameters.len(), 2);
    assert_eq!(child_keys(user), vec!["roles"]);
}

/// Merging recurses into matching grandchildren.
#[test]
fn test_merge_is_recursive() {
    let mut set = JoinSet::new();
    set.insert(JoinSpec::parse("post.comments.author").unwrap());
    set.insert(JoinSpec::parse("post.comments.likes").unwrap());
    set.insert(JoinSpec::parse("post.tags").unwrap());

    assert_eq!(set.len(), 1);
    let post = set.get("post", JoinKind::Left).unwrap();
    assert_eq!(child_keys(post), vec!["comments", "tags"]);
    assert_eq!(post.node_count(), 5);
}

/// Same key, different kind: two siblings.
#[test]
fn test_different_kind_is_separate_node() {
    let mut condition = QueryCondition::new();
    condition.add_join_with("user", JoinKind::Inner).unwrap();
    condition.add_join_with("user", JoinKind::Left).unwrap();

    assert_eq!(condition.joins().len(), 2);

    let spec = SpecCompiler::compile(&condition).unwrap();
    let kinds: Vec<JoinKind> = spec.traversals.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![JoinKind::Inner, JoinKind::Left]);
}

/// Identity ignores filters and fetch flags.
#[test]
fn test_identity_is_key_and_kind() {
    let a = JoinSpec::path("user", JoinKind::Left, true).unwrap();
    let b = JoinSpec::path("user", JoinKind::Left, false).unwrap();
    let c = JoinSpec::path("user", JoinKind::Right, true).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.identity(), b.identity());
}

/// Every segment of a dotted path gets the given kind and fetch flag.
#[test]
fn test_path_segments_share_kind_and_fetch() {
    let spec = JoinSpec::path("a.b.c", JoinKind::Inner, false).unwrap();
    let b = spec.children().get("b", JoinKind::Inner).unwrap();
    let c = b.children().get("c", JoinKind::Inner).unwrap();

    assert!(!spec.fetch() && !b.fetch() && !c.fetch());
}

/// A dotted path equals explicit nesting.
#[test]
fn test_dotted_path_equals_nesting() {
    let parsed = JoinSpec::parse("comments.user").unwrap();
    let nested = JoinSpec::parse("comments")
        .unwrap()
        .with_child(JoinSpec::parse("user").unwrap());

    let mut left = QueryCondition::new();
    left.add_join_spec(parsed);
    let mut right = QueryCondition::new();
    right.add_join_spec(nested);

    assert_eq!(
        SpecCompiler::compile(&left).unwrap(),
        SpecCompiler::compile(&right).unwrap()
    );
}

// =============================================================================
// Serialized Form Tests
// =============================================================================

/// A JSON join list with duplicates deserializes merged.
#[test]
fn test_json_joins_merge() {
    let json = r#"{
        "joins": [
            {"key": "user.address"},
            {"key": "user", "children": [{"key": "company"}]},
            {"key": "tags", "kind": "INNER", "fetch": false}
        ]
    }"#;
    let condition = QueryCondition::from_json(json).unwrap();

    assert_eq!(condition.joins().len(), 2);
    let user = condition.joins().get("user", JoinKind::Left).unwrap();
    assert_eq!(child_keys(user), vec!["address", "company"]);

    let tags = condition.joins().get("tags", JoinKind::Inner).unwrap();
    assert!(!tags.fetch());
}

/// A malformed join path in JSON is rejected.
#[test]
fn test_json_bad_join_path_rejected() {
    let json = r#"{"joins": [{"key": "user..address"}]}"#;
    assert!(QueryCondition::from_json(json).is_err());
}
