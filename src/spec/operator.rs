//! Operator catalog
//!
//! Closed set of comparison semantics. The compiler dispatches on these
//! with an exhaustive match, so adding a variant without a compiled
//! comparison fails the build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::SpecError;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    NotEquals,
    /// Substring match, `%value%`
    Like,
    LikeIgnoreCase,
    StartsWith,
    StartsWithIgnoreCase,
    EndsWith,
    EndsWithIgnoreCase,
    Contains,
    ContainsIgnoreCase,
    NotContains,
    NotContainsIgnoreCase,
    /// Numeric ordering
    GreaterThan,
    /// Temporal ordering
    GreaterThanTime,
    GreaterEquals,
    GreaterEqualsTime,
    LessThan,
    LessThanTime,
    LessEquals,
    LessEqualsTime,
    In,
    NotIn,
    Null,
    NotNull,
    Between,
    NotBetween,
    /// Collection has no elements
    IsEmpty,
    IsNotEmpty,
    /// Collection size comparisons
    SizeEquals,
    SizeGreaterThan,
    SizeLessThan,
    SizeGreaterEquals,
    SizeLessEquals,
}

/// Shape of the value an operator expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Value is ignored
    None,
    /// Any non-list value
    Scalar,
    /// Any non-list value, used as text
    Text,
    /// Integer or float
    Number,
    /// Number or timestamp text
    Temporal,
    /// List of values
    List,
    /// List of exactly two non-null scalars
    Pair,
    /// Non-negative integer
    Size,
}

impl Operator {
    /// Every operator, in declaration order
    pub const ALL: [Operator; 33] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Like,
        Operator::LikeIgnoreCase,
        Operator::StartsWith,
        Operator::StartsWithIgnoreCase,
        Operator::EndsWith,
        Operator::EndsWithIgnoreCase,
        Operator::Contains,
        Operator::ContainsIgnoreCase,
        Operator::NotContains,
        Operator::NotContainsIgnoreCase,
        Operator::GreaterThan,
        Operator::GreaterThanTime,
        Operator::GreaterEquals,
        Operator::GreaterEqualsTime,
        Operator::LessThan,
        Operator::LessThanTime,
        Operator::LessEquals,
        Operator::LessEqualsTime,
        Operator::In,
        Operator::NotIn,
        Operator::Null,
        Operator::NotNull,
        Operator::Between,
        Operator::NotBetween,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::SizeEquals,
        Operator::SizeGreaterThan,
        Operator::SizeLessThan,
        Operator::SizeGreaterEquals,
        Operator::SizeLessEquals,
    ];

    /// Returns the wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Like => "LIKE",
            Operator::LikeIgnoreCase => "LIKE_IGNORE_CASE",
            Operator::StartsWith => "STARTS_WITH",
            Operator::StartsWithIgnoreCase => "STARTS_WITH_IGNORE_CASE",
            Operator::EndsWith => "ENDS_WITH",
            Operator::EndsWithIgnoreCase => "ENDS_WITH_IGNORE_CASE",
            Operator::Contains => "CONTAINS",
            Operator::ContainsIgnoreCase => "CONTAINS_IGNORE_CASE",
            Operator::NotContains => "NOT_CONTAINS",
            Operator::NotContainsIgnoreCase => "NOT_CONTAINS_IGNORE_CASE",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::GreaterThanTime => "GREATER_THAN_TIME",
            Operator::GreaterEquals => "GREATER_EQUALS",
            Operator::GreaterEqualsTime => "GREATER_EQUALS_TIME",
            Operator::LessThan => "LESS_THAN",
            Operator::LessThanTime => "LESS_THAN_TIME",
            Operator::LessEquals => "LESS_EQUALS",
            Operator::LessEqualsTime => "LESS_EQUALS_TIME",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Null => "NULL",
            Operator::NotNull => "NOT_NULL",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT_BETWEEN",
            Operator::IsEmpty => "IS_EMPTY",
            Operator::IsNotEmpty => "IS_NOT_EMPTY",
            Operator::SizeEquals => "SIZE_EQUALS",
            Operator::SizeGreaterThan => "SIZE_GREATER_THAN",
            Operator::SizeLessThan => "SIZE_LESS_THAN",
            Operator::SizeGreaterEquals => "SIZE_GREATER_EQUALS",
            Operator::SizeLessEquals => "SIZE_LESS_EQUALS",
        }
    }

    /// Returns true for operators that take no value.
    ///
    /// Only these operators survive a null value; every other operator
    /// with a null value is skipped during compilation.
    pub fn is_nullness(&self) -> bool {
        matches!(
            self,
            Operator::Null | Operator::NotNull | Operator::IsEmpty | Operator::IsNotEmpty
        )
    }

    /// Returns true for the case-insensitive pattern operators
    pub fn is_ignore_case(&self) -> bool {
        matches!(
            self,
            Operator::LikeIgnoreCase
                | Operator::StartsWithIgnoreCase
                | Operator::EndsWithIgnoreCase
                | Operator::ContainsIgnoreCase
                | Operator::NotContainsIgnoreCase
        )
    }

    /// Returns the value shape this operator expects
    pub fn expected_shape(&self) -> ValueShape {
        match self {
            Operator::Null | Operator::NotNull | Operator::IsEmpty | Operator::IsNotEmpty => {
                ValueShape::None
            }
            Operator::Equals | Operator::NotEquals => ValueShape::Scalar,
            Operator::Like
            | Operator::LikeIgnoreCase
            | Operator::StartsWith
            | Operator::StartsWithIgnoreCase
            | Operator::EndsWith
            | Operator::EndsWithIgnoreCase
            | Operator::Contains
            | Operator::ContainsIgnoreCase
            | Operator::NotContains
            | Operator::NotContainsIgnoreCase => ValueShape::Text,
            Operator::GreaterThan
            | Operator::GreaterEquals
            | Operator::LessThan
            | Operator::LessEquals => ValueShape::Number,
            Operator::GreaterThanTime
            | Operator::GreaterEqualsTime
            | Operator::LessThanTime
            | Operator::LessEqualsTime => ValueShape::Temporal,
            Operator::In | Operator::NotIn => ValueShape::List,
            Operator::Between | Operator::NotBetween => ValueShape::Pair,
            Operator::SizeEquals
            | Operator::SizeGreaterThan
            | Operator::SizeLessThan
            | Operator::SizeGreaterEquals
            | Operator::SizeLessEquals => ValueShape::Size,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SpecError::invalid_condition(format!("Unknown operator: {}", s)))
    }
}
