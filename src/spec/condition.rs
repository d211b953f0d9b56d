//! Query conditions
//!
//! The root of a specification: the root filter group, the top-level
//! join set and the result-shaping flags.

use serde::{Deserialize, Serialize};

use super::builder::Conditions;
use super::errors::SpecResult;
use super::filter::FilterGroup;
use super::join::{JoinKind, JoinSet, JoinSpec};

/// Declarative description of a query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryCondition {
    /// Root filter, rooted at the queried entity
    #[serde(default)]
    pub filter: FilterGroup,
    /// Top-level joins
    #[serde(default, skip_serializing_if = "JoinSet::is_empty")]
    joins: JoinSet,
    /// Deduplicate result rows
    #[serde(default)]
    pub distinct: bool,
    /// Treat every join as a plain join, whatever its own fetch flag
    #[serde(default)]
    pub suppress_fetch: bool,
}

impl QueryCondition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a condition from JSON, checking every parameter
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let condition: QueryCondition = serde_json::from_str(json)?;
        condition.validate()?;
        Ok(condition)
    }

    pub fn filter(&self) -> &FilterGroup {
        &self.filter
    }

    pub fn joins(&self) -> &JoinSet {
        &self.joins
    }

    /// Replaces the root OR group and returns it
    pub fn set_or_group(&mut self, group: FilterGroup) -> &mut FilterGroup {
        self.filter.set_or_group(group);
        self.filter.or_group_mut()
    }

    /// Root OR group, created on first use
    pub fn or_group_mut(&mut self) -> &mut FilterGroup {
        self.filter.or_group_mut()
    }

    /// Adds a dotted join path (LEFT, fetch) and returns its top node
    pub fn add_join(&mut self, path: &str) -> SpecResult<&mut JoinSpec> {
        self.add_join_with(path, JoinKind::default())
    }

    /// Adds a dotted join path of the given kind and returns its top node
    pub fn add_join_with(&mut self, path: &str, kind: JoinKind) -> SpecResult<&mut JoinSpec> {
        let spec = JoinSpec::path(path, kind, true)?;
        Ok(self.joins.insert(spec))
    }

    /// Adds a prebuilt join and returns the surviving top node
    pub fn add_join_spec(&mut self, spec: JoinSpec) -> &mut JoinSpec {
        self.joins.insert(spec)
    }

    /// Adds several dotted join paths
    pub fn add_joins<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) -> SpecResult<&mut Self> {
        for path in paths {
            self.add_join(path)?;
        }
        Ok(self)
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_suppress_fetch(mut self, suppress_fetch: bool) -> Self {
        self.suppress_fetch = suppress_fetch;
        self
    }

    /// Checks the root filter and every join filter
    pub fn validate(&self) -> SpecResult<()> {
        self.filter.validate()?;
        self.joins.iter().try_for_each(JoinSpec::validate)
    }
}

impl Conditions for QueryCondition {
    fn filter_mut(&mut self) -> &mut FilterGroup {
        &mut self.filter
    }
}
