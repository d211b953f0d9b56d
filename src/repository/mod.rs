//! Repository layer
//!
//! Where conditions meet a store. `SpecificationExecutor` is the contract
//! a store fulfils; `InMemoryRepository` implements it over JSON
//! documents; `EntityService` layers the common lookups on top.
//!
//! Pagination limits come from `PaginationConfig`: a missing request
//! means the default first page, a size of zero or above the maximum is
//! rejected with `REPO_INVALID_PAGE`.

mod aggregate;
mod errors;
mod memory;
mod page;
mod service;

pub use aggregate::{aggregate, AggregationField, AggregationType};
pub use errors::{RepositoryError, RepositoryResult};
pub use memory::{InMemoryRepository, SpecificationExecutor};
pub use page::{Page, PageRequest, Paginator};
pub use service::{EntityService, FilterTranslator, DEFAULT_ID_FIELD};

pub use crate::executor::{SortDirection, SortField};
