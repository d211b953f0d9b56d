//! Observability
//!
//! - Structured logging through `tracing`, one named `Event` per line
//! - Monotonic counters in a `MetricsRegistry`
//!
//! Observability is read-only: nothing here changes what a query
//! compiles to or returns.
//!
//! # Usage
//!
//! ```ignore
//! use queryspec::observability::{Event, MetricsRegistry};
//!
//! tracing::info!(event = %Event::QueryExecuted, rows = 42, "query executed");
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};
