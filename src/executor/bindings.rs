//! Join binding enumeration
//!
//! A binding assigns one related row (or NULL) to every traversal of a
//! compiled spec. A relationship attribute holding an array yields one row
//! per element; any other non-null value yields one row; null or missing
//! yields none. When a traversal yields no rows, INNER and RIGHT joins drop
//! the binding while LEFT and FULL keep it with a NULL row.

use serde_json::Value;

use super::errors::{ExecutorError, ExecutorResult};
use crate::compiler::Traversal;
use crate::spec::JoinKind;

/// Rows bound to each traversal, indexed by traversal id
pub type Binding<'a> = Vec<Option<&'a Value>>;

/// Enumerates every binding of `document` over `traversals`.
///
/// Traversals must be in preorder. With no traversals the document has
/// exactly one, empty, binding.
pub fn enumerate<'a>(
    document: &'a Value,
    traversals: &[Traversal],
    limit: usize,
) -> ExecutorResult<Vec<Binding<'a>>> {
    let mut bindings: Vec<Binding<'a>> = vec![Vec::with_capacity(traversals.len())];

    for traversal in traversals {
        let mut next = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let base = match traversal.parent {
                None => Some(document),
                Some(parent) => binding.get(parent).copied().flatten(),
            };
            let rows = base
                .map(|row| related_rows(row, &traversal.attribute))
                .unwrap_or_default();

            if rows.is_empty() {
                if preserves_unmatched(traversal.kind) {
                    let mut extended = binding;
                    extended.push(None);
                    next.push(extended);
                }
                continue;
            }
            for row in rows {
                let mut extended = binding.clone();
                extended.push(Some(row));
                next.push(extended);
            }
            if next.len() > limit {
                return Err(ExecutorError::binding_limit(limit));
            }
        }
        bindings = next;
    }

    Ok(bindings)
}

/// True for kinds that keep the left side when nothing is related.
///
/// RIGHT and FULL have no unmatched right-hand rows to surface when
/// traversing from a document, so they reduce to INNER and LEFT.
fn preserves_unmatched(kind: JoinKind) -> bool {
    match kind {
        JoinKind::Inner | JoinKind::Right => false,
        JoinKind::Left | JoinKind::Full => true,
    }
}

fn related_rows<'a>(row: &'a Value, attribute: &str) -> Vec<&'a Value> {
    match row.get(attribute) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|item| !item.is_null()).collect(),
        Some(value) => vec![value],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TraversalMode;
    use serde_json::json;

    fn traversal(id: usize, parent: Option<usize>, attribute: &str, kind: JoinKind) -> Traversal {
        Traversal {
            id,
            parent,
            attribute: attribute.to_string(),
            kind,
            mode: TraversalMode::Join,
        }
    }

    #[test]
    fn test_no_traversals_single_binding() {
        let doc = json!({"id": 1});
        let bindings = enumerate(&doc, &[], 10).unwrap();
        assert_eq!(bindings, vec![Vec::<Option<&Value>>::new()]);
    }

    #[test]
    fn test_array_yields_row_per_element() {
        let doc = json!({"comments": [{"id": 1}, {"id": 2}]});
        let traversals = [traversal(0, None, "comments", JoinKind::Inner)];
        let bindings = enumerate(&doc, &traversals, 10).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[1][0], Some(&json!({"id": 2})));
    }

    #[test]
    fn test_inner_drops_and_left_keeps() {
        let doc = json!({"comments": []});

        let inner = [traversal(0, None, "comments", JoinKind::Inner)];
        assert!(enumerate(&doc, &inner, 10).unwrap().is_empty());

        let left = [traversal(0, None, "comments", JoinKind::Left)];
        assert_eq!(enumerate(&doc, &left, 10).unwrap(), vec![vec![None]]);
    }

    #[test]
    fn test_nested_traversal_uses_parent_row() {
        let doc = json!({
            "comments": [
                {"user": {"name": "ann"}},
                {"user": null}
            ]
        });
        let traversals = [
            traversal(0, None, "comments", JoinKind::Left),
            traversal(1, Some(0), "user", JoinKind::Left),
        ];
        let bindings = enumerate(&doc, &traversals, 10).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0][1], Some(&json!({"name": "ann"})));
        assert_eq!(bindings[1][1], None);
    }

    #[test]
    fn test_limit_enforced() {
        let doc = json!({"a": [1, 2, 3], "b": [1, 2, 3]});
        let traversals = [
            traversal(0, None, "a", JoinKind::Inner),
            traversal(1, None, "b", JoinKind::Inner),
        ];
        assert!(enumerate(&doc, &traversals, 9).is_ok());
        assert!(enumerate(&doc, &traversals, 8).is_err());
    }
}
