//! Explain output
//!
//! Deterministic, human-readable rendering of a compilation.

use std::fmt;

use serde::Serialize;

use super::predicate::CompiledSpec;
use crate::spec::SpecError;

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether compilation succeeded
    pub accepted: bool,
    /// Rendered predicate (if accepted)
    pub predicate: Option<String>,
    /// Rendered traversals, in preorder
    pub traversals: Vec<String>,
    pub distinct: bool,
    pub skipped_parameters: usize,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful compilation
    pub fn from_spec(spec: &CompiledSpec) -> Self {
        Self {
            accepted: true,
            predicate: Some(spec.predicate.to_string()),
            traversals: spec.traversals.iter().map(ToString::to_string).collect(),
            distinct: spec.distinct,
            skipped_parameters: spec.skipped_parameters,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a compilation error
    pub fn from_error(err: &SpecError) -> Self {
        Self {
            accepted: false,
            predicate: None,
            traversals: Vec::new(),
            distinct: false,
            skipped_parameters: 0,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(predicate) = &self.predicate {
                writeln!(f, "Predicate: {}", predicate)?;
            }
            if !self.traversals.is_empty() {
                writeln!(f, "Traversals:")?;
                for traversal in &self.traversals {
                    writeln!(f, "  - {}", traversal)?;
                }
            }
            writeln!(f, "Distinct: {}", self.distinct)?;
            if self.skipped_parameters > 0 {
                writeln!(f, "Skipped Parameters: {}", self.skipped_parameters)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SpecCompiler;
    use crate::spec::{Conditions, Operator, QueryCondition};

    #[test]
    fn test_explain_accepted() {
        let mut condition = QueryCondition::new();
        condition.add_equal("status", "active");
        condition.add_join("comments.user").unwrap();

        let spec = SpecCompiler::compile(&condition).unwrap();
        let output = ExplainPlan::from_spec(&spec).to_string();

        assert!(output.contains("=== EXPLAIN PLAN ==="));
        assert!(output.contains("Status: ACCEPTED"));
        assert!(output.contains("Predicate: status = 'active'"));
        assert!(output.contains("j0: LEFT FETCH root.comments"));
        assert!(output.contains("j1: LEFT FETCH j0.user"));
    }

    #[test]
    fn test_explain_rejected() {
        let err = SpecError::invalid_value("age", Operator::GreaterThan, "expected a number");
        let output = ExplainPlan::from_error(&err).to_string();

        assert!(output.contains("Status: REJECTED"));
        assert!(output.contains("SPEC_INVALID_VALUE"));
    }

    #[test]
    fn test_explain_is_deterministic() {
        let mut condition = QueryCondition::new();
        condition.add_in("status", ["a", "b"]).add_like("name", "x");

        let spec = SpecCompiler::compile(&condition).unwrap();
        assert_eq!(
            ExplainPlan::from_spec(&spec).to_string(),
            ExplainPlan::from_spec(&spec).to_string()
        );
    }
}
