//! Filter groups
//!
//! An ordered list of parameters combined with AND, plus an optional OR
//! group whose parameters are combined with OR. Only one level of OR
//! nesting is honored: the OR group's own `or_group` is carried but
//! never compiled.

use serde::{Deserialize, Serialize};

use super::builder::Conditions;
use super::errors::SpecResult;
use super::parameter::ConditionParameter;

/// A group of condition parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGroup {
    /// Parameters combined with AND, in insertion order
    #[serde(default)]
    pub parameters: Vec<ConditionParameter>,
    /// Parameters combined with OR, ANDed with the parameters above
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "or_filter")]
    pub or_group: Option<Box<FilterGroup>>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter
    pub fn add_parameter(&mut self, parameter: ConditionParameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    /// Replaces the OR group
    pub fn set_or_group(&mut self, group: FilterGroup) -> &mut Self {
        self.or_group = Some(Box::new(group));
        self
    }

    /// Returns the OR group, creating an empty one if absent
    pub fn or_group_mut(&mut self) -> &mut FilterGroup {
        self.or_group.get_or_insert_with(Box::default)
    }

    pub fn or_group(&self) -> Option<&FilterGroup> {
        self.or_group.as_deref()
    }

    /// Parameters that contribute a comparison
    pub fn active_parameters(&self) -> impl Iterator<Item = &ConditionParameter> {
        self.parameters.iter().filter(|p| !p.is_skipped())
    }

    /// True when neither the group nor its OR group holds a parameter
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.or_group().map_or(true, FilterGroup::is_empty)
    }

    /// Checks every parameter, including the OR group's
    pub fn validate(&self) -> SpecResult<()> {
        for parameter in &self.parameters {
            parameter.validate()?;
        }
        if let Some(or_group) = self.or_group() {
            or_group.validate()?;
        }
        Ok(())
    }
}

impl Conditions for FilterGroup {
    fn filter_mut(&mut self) -> &mut FilterGroup {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ConditionValue, Operator};

    #[test]
    fn test_append_preserves_order() {
        let mut group = FilterGroup::new();
        group.add_equal("b", 1).add_equal("a", 2).add_like("c", "x");

        let paths: Vec<&str> = group.parameters.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_active_parameters_skip_nulls() {
        let mut group = FilterGroup::new();
        group
            .add_equal("status", ConditionValue::Null)
            .add_null("deleted_at")
            .add_greater_than("age", 18);

        let active: Vec<Operator> = group.active_parameters().map(|p| p.operator).collect();
        assert_eq!(active, vec![Operator::Null, Operator::GreaterThan]);
    }

    #[test]
    fn test_is_empty_looks_into_or_group() {
        let mut group = FilterGroup::new();
        assert!(group.is_empty());

        group.or_group_mut();
        assert!(group.is_empty());

        group.or_group_mut().add_equal("role", "admin");
        assert!(!group.is_empty());
    }

    #[test]
    fn test_validate_reaches_or_group() {
        let mut group = FilterGroup::new();
        group.add_equal("status", "active");
        group.or_group_mut().add_greater_than("age", "not a number");
        assert!(group.validate().is_err());
    }
}
