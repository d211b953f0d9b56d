//! Observable events
//!
//! Every structured log line carries one of these names in its `event`
//! field.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Engine configuration loaded
    ConfigLoaded,

    // Compilation
    /// Condition compiled into a predicate
    CompileComplete,
    /// Condition rejected by the compiler
    CompileRejected,
    /// Parameter with a null value left out of a clause
    ParameterSkipped,
    /// Duplicate join folded into an existing node
    JoinMerged,

    // Execution
    /// Compiled query executed against a repository
    QueryExecuted,
    /// Lookup expecting one entity matched none
    EntityNotFound,
    /// Request rejected before execution
    RequestRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CompileComplete => "COMPILE_COMPLETE",
            Event::CompileRejected => "COMPILE_REJECTED",
            Event::ParameterSkipped => "PARAMETER_SKIPPED",
            Event::JoinMerged => "JOIN_MERGED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::EntityNotFound => "ENTITY_NOT_FOUND",
            Event::RequestRejected => "REQUEST_REJECTED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::CompileRejected | Event::EntityNotFound | Event::RequestRejected
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::CompileComplete,
            Event::CompileRejected,
            Event::ParameterSkipped,
            Event::JoinMerged,
            Event::QueryExecuted,
            Event::EntityNotFound,
            Event::RequestRejected,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::CompileRejected.is_failure());
        assert!(Event::EntityNotFound.is_failure());
        assert!(!Event::CompileComplete.is_failure());
        assert!(!Event::JoinMerged.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::ParameterSkipped), "PARAMETER_SKIPPED");
    }
}
