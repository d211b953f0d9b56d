//! Join specification tree
//!
//! A join node is identified by `(key, kind)` alone. Sibling sets never
//! hold two nodes with the same identity: inserting a duplicate folds the
//! incoming node's children into the existing node and drops the incoming
//! node's own filter and fetch flag.
//!
//! Nodes own their children, so a node can never cite one of its
//! ancestors and cyclic trees cannot be built.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::builder::Conditions;
use super::errors::{SpecError, SpecResult};
use super::filter::FilterGroup;
use super::parameter::split_path;
use crate::observability::Event;

/// Relational join kind
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a join node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey {
    pub key: String,
    pub kind: JoinKind,
}

/// One relationship traversal with its filter and nested traversals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawJoinSpec", into = "RawJoinSpec")]
pub struct JoinSpec {
    key: String,
    kind: JoinKind,
    filter: FilterGroup,
    children: JoinSet,
    fetch: bool,
}

impl JoinSpec {
    /// Parses a dotted path with the default kind (LEFT) and fetch enabled.
    ///
    /// `"a.b.c"` becomes `a` with one child `b` with one child `c`.
    pub fn parse(path: &str) -> SpecResult<Self> {
        Self::path(path, JoinKind::default(), true)
    }

    /// Parses a dotted path; every segment gets `kind` and `fetch`
    pub fn path(path: &str, kind: JoinKind, fetch: bool) -> SpecResult<Self> {
        let segments = split_path(path)?;
        let mut node: Option<JoinSpec> = None;
        for segment in segments.into_iter().rev() {
            let mut parent = Self::single(segment, kind, fetch);
            if let Some(child) = node.take() {
                parent.children.insert(child);
            }
            node = Some(parent);
        }
        node.ok_or_else(|| SpecError::invalid_path(path))
    }

    fn single(key: &str, kind: JoinKind, fetch: bool) -> Self {
        Self {
            key: key.trim().to_string(),
            kind,
            filter: FilterGroup::default(),
            children: JoinSet::default(),
            fetch,
        }
    }

    /// Relationship name
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn identity(&self) -> JoinKey {
        JoinKey {
            key: self.key.clone(),
            kind: self.kind,
        }
    }

    pub fn fetch(&self) -> bool {
        self.fetch
    }

    pub fn filter(&self) -> &FilterGroup {
        &self.filter
    }

    pub fn children(&self) -> &JoinSet {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut JoinSet {
        &mut self.children
    }

    /// Sets the fetch flag of this node only
    pub fn with_fetch(mut self, fetch: bool) -> Self {
        self.fetch = fetch;
        self
    }

    /// Replaces the filter
    pub fn with_filter(mut self, filter: FilterGroup) -> Self {
        self.filter = filter;
        self
    }

    /// Adds a child, merging on identity
    pub fn with_child(mut self, child: JoinSpec) -> Self {
        self.children.insert(child);
        self
    }

    /// Adds a child and returns the surviving node
    pub fn add_child(&mut self, child: JoinSpec) -> &mut JoinSpec {
        self.children.insert(child)
    }

    /// Parses a dotted path and adds it below this node
    pub fn add_child_path(&mut self, path: &str) -> SpecResult<&mut JoinSpec> {
        let child = Self::path(path, self.kind, self.fetch)?;
        Ok(self.children.insert(child))
    }

    /// Follows a dotted path of child keys, first match per segment
    pub fn descendant_mut(&mut self, path: &str) -> Option<&mut JoinSpec> {
        let mut node = self;
        for segment in path.split('.') {
            node = node.children.find_mut(segment)?;
        }
        Some(node)
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(JoinSpec::node_count).sum::<usize>()
    }

    /// Checks the filters of this subtree
    pub fn validate(&self) -> SpecResult<()> {
        self.filter.validate()?;
        self.children.iter().try_for_each(JoinSpec::validate)
    }

    fn merge(&mut self, incoming: JoinSpec) {
        for child in incoming.children.into_nodes() {
            self.children.insert(child);
        }
    }
}

impl PartialEq for JoinSpec {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.kind == other.kind
    }
}

impl Eq for JoinSpec {}

impl Hash for JoinSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.kind.hash(state);
    }
}

impl Conditions for JoinSpec {
    fn filter_mut(&mut self) -> &mut FilterGroup {
        &mut self.filter
    }
}

/// Serialized form of a join node.
///
/// `key` may be a dotted path; `filter` and `children` then attach to the
/// first segment, as with `QueryCondition::add_join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawJoinSpec {
    key: String,
    #[serde(default)]
    kind: JoinKind,
    #[serde(default, skip_serializing_if = "FilterGroup::is_empty")]
    filter: FilterGroup,
    #[serde(default, skip_serializing_if = "JoinSet::is_empty")]
    children: JoinSet,
    #[serde(default = "default_fetch")]
    fetch: bool,
}

fn default_fetch() -> bool {
    true
}

impl TryFrom<RawJoinSpec> for JoinSpec {
    type Error = SpecError;

    fn try_from(raw: RawJoinSpec) -> Result<Self, Self::Error> {
        let mut spec = JoinSpec::path(&raw.key, raw.kind, raw.fetch)?;
        spec.filter = raw.filter;
        for child in raw.children.into_nodes() {
            spec.children.insert(child);
        }
        Ok(spec)
    }
}

impl From<JoinSpec> for RawJoinSpec {
    fn from(spec: JoinSpec) -> Self {
        Self {
            key: spec.key,
            kind: spec.kind,
            filter: spec.filter,
            children: spec.children,
            fetch: spec.fetch,
        }
    }
}

/// A deduplicated set of sibling join nodes, ordered by identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<JoinSpec>", into = "Vec<JoinSpec>")]
pub struct JoinSet {
    nodes: BTreeMap<JoinKey, JoinSpec>,
}

impl JoinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node and returns the surviving node.
    ///
    /// If a node with the same `(key, kind)` exists, the incoming node's
    /// children are merged into it recursively and the rest of the
    /// incoming node is dropped.
    pub fn insert(&mut self, spec: JoinSpec) -> &mut JoinSpec {
        match self.nodes.entry(spec.identity()) {
            btree_map::Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                tracing::trace!(
                    event = %Event::JoinMerged,
                    key = %existing.key,
                    kind = %existing.kind,
                    "merged duplicate join"
                );
                existing.merge(spec);
                existing
            }
            btree_map::Entry::Vacant(entry) => entry.insert(spec),
        }
    }

    pub fn get(&self, key: &str, kind: JoinKind) -> Option<&JoinSpec> {
        self.nodes.get(&JoinKey {
            key: key.to_string(),
            kind,
        })
    }

    pub fn get_mut(&mut self, key: &str, kind: JoinKind) -> Option<&mut JoinSpec> {
        self.nodes.get_mut(&JoinKey {
            key: key.to_string(),
            kind,
        })
    }

    /// First node with the given key, whatever its kind
    pub fn find_mut(&mut self, key: &str) -> Option<&mut JoinSpec> {
        self.nodes.values_mut().find(|node| node.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JoinSpec> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn into_nodes(self) -> impl Iterator<Item = JoinSpec> {
        self.nodes.into_values()
    }
}

impl From<Vec<JoinSpec>> for JoinSet {
    fn from(specs: Vec<JoinSpec>) -> Self {
        specs.into_iter().collect()
    }
}

impl From<JoinSet> for Vec<JoinSpec> {
    fn from(set: JoinSet) -> Self {
        set.into_nodes().collect()
    }
}

impl FromIterator<JoinSpec> for JoinSet {
    fn from_iter<I: IntoIterator<Item = JoinSpec>>(iter: I) -> Self {
        let mut set = JoinSet::new();
        for spec in iter {
            set.insert(spec);
        }
        set
    }
}

impl<'a> IntoIterator for &'a JoinSet {
    type Item = &'a JoinSpec;
    type IntoIter = btree_map::Values<'a, JoinKey, JoinSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.values()
    }
}
