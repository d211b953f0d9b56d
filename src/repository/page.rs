//! Pagination
//!
//! `PageRequest` is what callers send; `Paginator` checks it against the
//! configured limits and cuts a `Page` out of a full result.

use serde::{Deserialize, Serialize};

use super::errors::{RepositoryError, RepositoryResult};
use crate::config::{PaginationConfig, DEFAULT_PAGE_SIZE};
use crate::executor::{SortDirection, SortField};

/// Page number, size and sort order requested by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Zero-based page index
    pub page_number: usize,
    pub page_size: usize,
    /// Single sort key, used when `sort_fields` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    /// Multiple sort keys, earlier keys first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_fields: Vec<SortField>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_direction: SortDirection::Asc,
            sort_fields: Vec::new(),
        }
    }
}

impl PageRequest {
    pub fn of(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    /// Single-key sorted request; `direction` is `asc`/`desc` in any case
    pub fn sorted(
        page_number: usize,
        page_size: usize,
        sort_by: impl Into<String>,
        direction: &str,
    ) -> Self {
        Self::of(page_number, page_size).with_sort(sort_by, direction)
    }

    pub fn first_page() -> Self {
        Self::default()
    }

    pub fn first_page_sized(page_size: usize) -> Self {
        Self::of(0, page_size)
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, direction: &str) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_direction = SortDirection::parse(direction);
        self
    }

    pub fn with_sort_fields(mut self, sort_fields: Vec<SortField>) -> Self {
        self.sort_fields = sort_fields;
        self
    }

    pub fn with_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The following page, same size and sort
    pub fn next_page(&self) -> Self {
        Self {
            page_number: self.page_number + 1,
            ..self.clone()
        }
    }

    /// The preceding page, never below page zero
    pub fn previous_page(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_sub(1),
            ..self.clone()
        }
    }

    /// Effective sort keys
    pub fn sort_keys(&self) -> Vec<SortField> {
        if !self.sort_fields.is_empty() {
            return self.sort_fields.clone();
        }
        match &self.sort_by {
            Some(field) if !field.trim().is_empty() => vec![SortField {
                field: field.clone(),
                direction: self.sort_direction,
            }],
            _ => Vec::new(),
        }
    }

    /// Index of the first element of this page
    pub fn offset(&self) -> usize {
        self.page_number.saturating_mul(self.page_size)
    }
}

/// One page of a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn is_first(&self) -> bool {
        self.page_number == 0
    }

    pub fn is_last(&self) -> bool {
        self.page_number.saturating_add(1) >= self.total_pages
    }

    pub fn has_next(&self) -> bool {
        !self.is_last()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Applies pagination limits
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// First page at the configured default size
    pub fn default_request(&self) -> PageRequest {
        PageRequest::of(0, self.config.default_page_size)
    }

    /// Returns the request to run, or the default one when absent
    pub fn resolve(&self, request: Option<&PageRequest>) -> RepositoryResult<PageRequest> {
        let request = match request {
            Some(request) => request.clone(),
            None => return Ok(self.default_request()),
        };
        if request.page_size == 0 {
            return Err(RepositoryError::InvalidPage(
                "page size must be at least 1".into(),
            ));
        }
        if request.page_size > self.config.max_page_size {
            return Err(RepositoryError::InvalidPage(format!(
                "page size {} exceeds maximum {}",
                request.page_size, self.config.max_page_size
            )));
        }
        Ok(request)
    }

    /// Cuts the requested page out of an already sorted full result
    pub fn page<T>(&self, rows: Vec<T>, request: &PageRequest) -> Page<T> {
        let total_elements = rows.len();
        let page_size = request.page_size.max(1);
        let content = rows
            .into_iter()
            .skip(request.offset())
            .take(page_size)
            .collect();
        Page {
            content,
            page_number: request.page_number,
            page_size,
            total_elements,
            total_pages: total_elements.div_ceil(page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page_number, 0);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.sort_direction, SortDirection::Asc);
        assert!(request.sort_keys().is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let request: PageRequest =
            serde_json::from_value(json!({"page_number": 2, "sort_by": "age", "sort_direction": "DESC"}))
                .unwrap();
        assert_eq!(request.page_size, 10);
        assert_eq!(request.sort_keys(), vec![SortField::desc("age")]);
    }

    #[test]
    fn test_next_and_previous() {
        let request = PageRequest::sorted(0, 20, "name", "desc");
        let next = request.next_page();
        assert_eq!(next.page_number, 1);
        assert_eq!(next.page_size, 20);
        assert_eq!(next.sort_direction, SortDirection::Desc);
        assert_eq!(next.previous_page().page_number, 0);
        assert_eq!(request.previous_page().page_number, 0);
    }

    #[test]
    fn test_sort_fields_take_precedence() {
        let request = PageRequest::first_page()
            .with_sort("age", "asc")
            .with_sort_fields(vec![SortField::desc("name")]);
        assert_eq!(request.sort_keys(), vec![SortField::desc("name")]);
    }

    #[test]
    fn test_resolve_limits() {
        let paginator = Paginator::new(PaginationConfig {
            default_page_size: 5,
            max_page_size: 50,
        });
        assert_eq!(paginator.resolve(None).unwrap().page_size, 5);
        assert!(paginator.resolve(Some(&PageRequest::of(0, 50))).is_ok());
        assert!(paginator.resolve(Some(&PageRequest::of(0, 51))).is_err());
        assert!(paginator.resolve(Some(&PageRequest::of(0, 0))).is_err());
    }

    #[test]
    fn test_page_slicing() {
        let paginator = Paginator::default();
        let page = paginator.page((1..=25).collect::<Vec<i32>>(), &PageRequest::of(2, 10));
        assert_eq!(page.content, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.is_last());
        assert!(!page.is_first());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Paginator::default().page(vec![1, 2, 3], &PageRequest::of(5, 10));
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_last_page_at_max_page_number() {
        let page = Paginator::default().page(vec![1, 2, 3], &PageRequest::of(usize::MAX, 10));
        assert!(page.content.is_empty());
        assert!(page.is_last());
        assert!(!page.has_next());
    }
}
