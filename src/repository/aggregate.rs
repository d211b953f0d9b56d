//! Aggregation
//!
//! Folds the rows matched by a condition into one result row keyed by
//! each field's label.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{RepositoryError, RepositoryResult};
use crate::executor::{resolve_path, sort_order};

/// Aggregate function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregationType {
    pub const ALL: [AggregationType; 6] = [
        AggregationType::Count,
        AggregationType::CountDistinct,
        AggregationType::Sum,
        AggregationType::Avg,
        AggregationType::Max,
        AggregationType::Min,
    ];

    /// Parses a type name in any case; `-` and `_` are interchangeable
    pub fn parse(text: &str) -> Option<Self> {
        let name = text.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Count => "COUNT",
            AggregationType::CountDistinct => "COUNT_DISTINCT",
            AggregationType::Sum => "SUM",
            AggregationType::Avg => "AVG",
            AggregationType::Max => "MAX",
            AggregationType::Min => "MIN",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One aggregate over an attribute path (`*` counts rows)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationField {
    pub field_name: String,
    pub aggregation_type: AggregationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl AggregationField {
    pub fn of(field_name: impl Into<String>, aggregation_type: AggregationType) -> Self {
        Self {
            field_name: field_name.into(),
            aggregation_type,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn count() -> Self {
        Self::of("*", AggregationType::Count).with_alias("count")
    }

    pub fn count_distinct(field_name: impl Into<String>) -> Self {
        Self::of(field_name, AggregationType::CountDistinct).with_alias("countDistinct")
    }

    pub fn sum(field_name: impl Into<String>) -> Self {
        Self::of(field_name, AggregationType::Sum).with_alias("sum")
    }

    pub fn avg(field_name: impl Into<String>) -> Self {
        Self::of(field_name, AggregationType::Avg).with_alias("avg")
    }

    pub fn max(field_name: impl Into<String>) -> Self {
        Self::of(field_name, AggregationType::Max).with_alias("max")
    }

    pub fn min(field_name: impl Into<String>) -> Self {
        Self::of(field_name, AggregationType::Min).with_alias("min")
    }

    /// Result key: the alias, or `<type>_<field>` in lower case
    pub fn label(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => format!(
                "{}_{}",
                self.aggregation_type.as_str().to_lowercase(),
                self.field_name.replace('.', "_")
            ),
        }
    }

    fn values<'a>(&self, rows: &'a [Value]) -> Vec<&'a Value> {
        rows.iter()
            .filter_map(|row| resolve_path(row, &self.field_name))
            .filter(|value| !value.is_null())
            .collect()
    }

    fn numbers(&self, rows: &[Value]) -> RepositoryResult<Vec<f64>> {
        self.values(rows)
            .into_iter()
            .map(|value| {
                value.as_f64().ok_or_else(|| {
                    RepositoryError::InvalidAggregate(format!(
                        "{} over '{}' found non-numeric value {}",
                        self.aggregation_type, self.field_name, value
                    ))
                })
            })
            .collect()
    }

    /// Evaluates this aggregate over `rows`
    pub fn evaluate(&self, rows: &[Value]) -> RepositoryResult<Value> {
        let result = match self.aggregation_type {
            AggregationType::Count if self.field_name == "*" => Value::from(rows.len()),
            AggregationType::Count => Value::from(self.values(rows).len()),
            AggregationType::CountDistinct => {
                let distinct: HashSet<String> =
                    self.values(rows).iter().map(|v| v.to_string()).collect();
                Value::from(distinct.len())
            }
            AggregationType::Sum => {
                let numbers = self.numbers(rows)?;
                if numbers.is_empty() {
                    Value::Null
                } else {
                    number(numbers.iter().sum())
                }
            }
            AggregationType::Avg => {
                let numbers = self.numbers(rows)?;
                if numbers.is_empty() {
                    Value::Null
                } else {
                    number(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            AggregationType::Max => self
                .values(rows)
                .into_iter()
                .max_by(|a, b| sort_order(Some(*a), Some(*b)))
                .cloned()
                .unwrap_or(Value::Null),
            AggregationType::Min => self
                .values(rows)
                .into_iter()
                .min_by(|a, b| sort_order(Some(*a), Some(*b)))
                .cloned()
                .unwrap_or(Value::Null),
        };
        Ok(result)
    }
}

/// Evaluates every field over `rows` into one object keyed by label
pub fn aggregate(rows: &[Value], fields: &[AggregationField]) -> RepositoryResult<Map<String, Value>> {
    let mut out = Map::new();
    for field in fields {
        out.insert(field.label(), field.evaluate(rows)?);
    }
    Ok(out)
}

fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"price": 10, "category": "a"}),
            json!({"price": 25, "category": "b"}),
            json!({"price": 5, "category": "a"}),
            json!({"price": null, "category": null}),
        ]
    }

    #[test]
    fn test_count() {
        assert_eq!(AggregationField::count().evaluate(&rows()).unwrap(), json!(4));
        assert_eq!(
            AggregationField::of("price", AggregationType::Count)
                .evaluate(&rows())
                .unwrap(),
            json!(3)
        );
    }

    #[test]
    fn test_count_distinct() {
        let field = AggregationField::count_distinct("category");
        assert_eq!(field.evaluate(&rows()).unwrap(), json!(2));
    }

    #[test]
    fn test_sum_avg_min_max() {
        let rows = rows();
        assert_eq!(AggregationField::sum("price").evaluate(&rows).unwrap(), json!(40));
        assert_eq!(
            AggregationField::avg("price").evaluate(&rows).unwrap(),
            json!(40.0 / 3.0)
        );
        assert_eq!(AggregationField::min("price").evaluate(&rows).unwrap(), json!(5));
        assert_eq!(AggregationField::max("price").evaluate(&rows).unwrap(), json!(25));
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(AggregationField::sum("price").evaluate(&[]).unwrap(), Value::Null);
        assert_eq!(AggregationField::max("price").evaluate(&[]).unwrap(), Value::Null);
        assert_eq!(AggregationField::count().evaluate(&[]).unwrap(), json!(0));
    }

    #[test]
    fn test_sum_of_text_rejected() {
        let err = AggregationField::sum("category").evaluate(&rows()).unwrap_err();
        assert_eq!(err.code(), "REPO_INVALID_AGGREGATE");
    }

    #[test]
    fn test_labels() {
        assert_eq!(AggregationField::sum("price").label(), "sum");
        assert_eq!(
            AggregationField::of("user.age", AggregationType::Avg).label(),
            "avg_user_age"
        );
    }

    #[test]
    fn test_aggregate_row() {
        let row = aggregate(
            &rows(),
            &[AggregationField::count(), AggregationField::sum("price")],
        )
        .unwrap();
        assert_eq!(Value::Object(row), json!({"count": 4, "sum": 40}));
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(AggregationType::parse("sum"), Some(AggregationType::Sum));
        assert_eq!(
            AggregationType::parse("count-distinct"),
            Some(AggregationType::CountDistinct)
        );
        assert_eq!(AggregationType::parse("median"), None);
    }
}
