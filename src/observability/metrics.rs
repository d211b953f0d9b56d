//! Metrics registry
//!
//! Counters only, monotonic, relaxed atomics. A repository owns one
//! registry and updates it on every call.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Conditions compiled successfully
    conditions_compiled: AtomicU64,
    /// Conditions rejected by the compiler
    compilations_rejected: AtomicU64,
    /// Null-valued parameters left out of a clause
    parameters_skipped: AtomicU64,
    /// Queries executed
    queries_executed: AtomicU64,
    /// Rows returned by executed queries
    rows_returned: AtomicU64,
    /// Single-entity lookups that matched nothing
    entities_not_found: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_conditions_compiled(&self) {
        self.conditions_compiled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_compilations_rejected(&self) {
        self.compilations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_parameters_skipped(&self, count: u64) {
        self.parameters_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn increment_entities_not_found(&self) {
        self.entities_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            conditions_compiled: self.conditions_compiled.load(Ordering::Relaxed),
            compilations_rejected: self.compilations_rejected.load(Ordering::Relaxed),
            parameters_skipped: self.parameters_skipped.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            entities_not_found: self.entities_not_found.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub conditions_compiled: u64,
    pub compilations_rejected: u64,
    pub parameters_skipped: u64,
    pub queries_executed: u64,
    pub rows_returned: u64,
    pub entities_not_found: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.conditions_compiled, 0);
        assert_eq!(snapshot.queries_executed, 0);
        assert_eq!(snapshot.entities_not_found, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_conditions_compiled();
        registry.increment_conditions_compiled();
        registry.increment_compilations_rejected();
        registry.add_parameters_skipped(3);
        registry.increment_queries_executed();
        registry.add_rows_returned(25);
        registry.increment_entities_not_found();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.conditions_compiled, 2);
        assert_eq!(snapshot.compilations_rejected, 1);
        assert_eq!(snapshot.parameters_skipped, 3);
        assert_eq!(snapshot.queries_executed, 1);
        assert_eq!(snapshot.rows_returned, 25);
        assert_eq!(snapshot.entities_not_found, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_queries_executed();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["queries_executed"], 1);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_conditions_compiled();
                    reg.increment_queries_executed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.conditions_compiled, 1000);
        assert_eq!(snapshot.queries_executed, 1000);
    }
}
