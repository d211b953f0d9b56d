//! Result sorting
//!
//! Multi-key, stable, deterministic.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::values::{resolve_path, sort_order};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parses a direction; anything other than `desc` (any case) is ascending
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SortDirection::parse(s))
    }
}

impl From<String> for SortDirection {
    fn from(text: String) -> Self {
        SortDirection::parse(&text)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sort key: a dotted attribute path and a direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents by the given keys, earlier keys first.
    ///
    /// Sort is stable: documents equal on every key keep their order.
    pub fn sort(documents: &mut [Value], fields: &[SortField]) {
        if fields.is_empty() {
            return;
        }
        documents.sort_by(|a, b| {
            fields
                .iter()
                .map(|key| {
                    let ordering =
                        sort_order(resolve_path(a, &key.field), resolve_path(b, &key.field));
                    match key.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}
