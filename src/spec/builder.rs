//! Fluent condition builder
//!
//! Shared by `FilterGroup`, `QueryCondition` and `JoinSpec`. Builder
//! methods never fail; values whose shape does not fit the operator are
//! rejected when the condition is compiled.

use super::filter::FilterGroup;
use super::operator::Operator;
use super::parameter::ConditionParameter;
use super::value::ConditionValue;

/// Anything that owns a filter group to which conditions can be appended
pub trait Conditions {
    /// The filter group receiving new parameters
    fn filter_mut(&mut self) -> &mut FilterGroup;

    /// Appends a prebuilt parameter
    fn add_condition(&mut self, parameter: ConditionParameter) -> &mut Self {
        self.filter_mut().parameters.push(parameter);
        self
    }

    /// Appends a `(path, value, operator)` parameter
    fn add_parameter(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
        operator: Operator,
    ) -> &mut Self {
        self.add_condition(ConditionParameter::unchecked(path, value, operator))
    }

    fn add_equal(&mut self, path: impl Into<String>, value: impl Into<ConditionValue>) -> &mut Self {
        self.add_parameter(path, value, Operator::Equals)
    }

    fn add_not_equal(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::NotEquals)
    }

    /// Substring match (`%value%`)
    fn add_like(&mut self, path: impl Into<String>, value: impl Into<ConditionValue>) -> &mut Self {
        self.add_parameter(path, value, Operator::Like)
    }

    fn add_like_ignore_case(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::LikeIgnoreCase)
    }

    fn add_starts_with(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::StartsWith)
    }

    fn add_starts_with_ignore_case(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::StartsWithIgnoreCase)
    }

    fn add_ends_with(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::EndsWith)
    }

    fn add_ends_with_ignore_case(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::EndsWithIgnoreCase)
    }

    fn add_contains(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::Contains)
    }

    fn add_contains_ignore_case(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::ContainsIgnoreCase)
    }

    fn add_not_contains(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::NotContains)
    }

    fn add_not_contains_ignore_case(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::NotContainsIgnoreCase)
    }

    fn add_greater_than(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::GreaterThan)
    }

    fn add_greater_equals(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::GreaterEquals)
    }

    fn add_less_than(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::LessThan)
    }

    fn add_less_equals(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::LessEquals)
    }

    /// Lower numeric bound, inclusive
    fn add_min(&mut self, path: impl Into<String>, value: impl Into<ConditionValue>) -> &mut Self {
        self.add_greater_equals(path, value)
    }

    /// Upper numeric bound, inclusive
    fn add_max(&mut self, path: impl Into<String>, value: impl Into<ConditionValue>) -> &mut Self {
        self.add_less_equals(path, value)
    }

    fn add_greater_than_date(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::GreaterThanTime)
    }

    fn add_less_than_date(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::LessThanTime)
    }

    /// Lower temporal bound, inclusive
    fn add_min_date(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::GreaterEqualsTime)
    }

    /// Upper temporal bound, inclusive
    fn add_max_date(
        &mut self,
        path: impl Into<String>,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.add_parameter(path, value, Operator::LessEqualsTime)
    }

    fn add_in<V: Into<ConditionValue>>(
        &mut self,
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values: Vec<ConditionValue> = values.into_iter().map(Into::into).collect();
        self.add_parameter(path, ConditionValue::List(values), Operator::In)
    }

    fn add_not_in<V: Into<ConditionValue>>(
        &mut self,
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values: Vec<ConditionValue> = values.into_iter().map(Into::into).collect();
        self.add_parameter(path, ConditionValue::List(values), Operator::NotIn)
    }

    fn add_null(&mut self, path: impl Into<String>) -> &mut Self {
        self.add_parameter(path, ConditionValue::Null, Operator::Null)
    }

    fn add_not_null(&mut self, path: impl Into<String>) -> &mut Self {
        self.add_parameter(path, ConditionValue::Null, Operator::NotNull)
    }

    /// Inclusive range. Both bounds null means no restriction.
    fn add_between(
        &mut self,
        path: impl Into<String>,
        lower: impl Into<ConditionValue>,
        upper: impl Into<ConditionValue>,
    ) -> &mut Self {
        let value = bounds(lower.into(), upper.into());
        self.add_parameter(path, value, Operator::Between)
    }

    fn add_not_between(
        &mut self,
        path: impl Into<String>,
        lower: impl Into<ConditionValue>,
        upper: impl Into<ConditionValue>,
    ) -> &mut Self {
        let value = bounds(lower.into(), upper.into());
        self.add_parameter(path, value, Operator::NotBetween)
    }

    fn add_is_empty(&mut self, path: impl Into<String>) -> &mut Self {
        self.add_parameter(path, ConditionValue::Null, Operator::IsEmpty)
    }

    fn add_is_not_empty(&mut self, path: impl Into<String>) -> &mut Self {
        self.add_parameter(path, ConditionValue::Null, Operator::IsNotEmpty)
    }

    fn add_size_equals(&mut self, path: impl Into<String>, size: u32) -> &mut Self {
        self.add_parameter(path, size, Operator::SizeEquals)
    }

    fn add_size_greater_than(&mut self, path: impl Into<String>, size: u32) -> &mut Self {
        self.add_parameter(path, size, Operator::SizeGreaterThan)
    }

    fn add_size_less_than(&mut self, path: impl Into<String>, size: u32) -> &mut Self {
        self.add_parameter(path, size, Operator::SizeLessThan)
    }

    fn add_size_greater_equals(&mut self, path: impl Into<String>, size: u32) -> &mut Self {
        self.add_parameter(path, size, Operator::SizeGreaterEquals)
    }

    fn add_size_less_equals(&mut self, path: impl Into<String>, size: u32) -> &mut Self {
        self.add_parameter(path, size, Operator::SizeLessEquals)
    }

    /// Two independent temporal bounds; either may be null
    fn add_date_range(
        &mut self,
        path: impl Into<String>,
        start: impl Into<ConditionValue>,
        end: impl Into<ConditionValue>,
    ) -> &mut Self {
        let path = path.into();
        self.add_min_date(path.clone(), start).add_max_date(path, end)
    }

    /// Two independent numeric bounds; either may be null
    fn add_numeric_range(
        &mut self,
        path: impl Into<String>,
        min: impl Into<ConditionValue>,
        max: impl Into<ConditionValue>,
    ) -> &mut Self {
        let path = path.into();
        self.add_min(path.clone(), min).add_max(path, max)
    }
}

fn bounds(lower: ConditionValue, upper: ConditionValue) -> ConditionValue {
    if lower.is_null() && upper.is_null() {
        ConditionValue::Null
    } else {
        ConditionValue::List(vec![lower, upper])
    }
}
