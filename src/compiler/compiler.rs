//! Specification compiler
//!
//! Turns a `QueryCondition` into a `CompiledSpec`. Compilation is a pure
//! function of its input; the compiler holds no state between calls.
//!
//! # Combination order
//!
//! 1. Root clause: AND of the root parameters, ANDed with the OR of the
//!    root OR group's parameters
//! 2. Traversal mode per top-level join, inherited by its whole subtree
//! 3. Every join filter in the tree yields an AND clause and an OR clause,
//!    collected flat
//! 4. `AND(all join AND clauses) AND OR(all join OR clauses)`
//! 5. Root clause AND the result of step 4, or `Always` if both are absent

use tracing::{debug, trace, warn};

use super::predicate::{
    AttributeRef, Comparison, CompiledSpec, JoinId, Operand, Predicate, Source, Traversal,
    TraversalMode,
};
use crate::observability::Event;
use crate::spec::{
    split_path, ConditionParameter, ConditionValue, FilterGroup, JoinSpec, Operator,
    QueryCondition, SpecError, SpecResult,
};

/// What the compiled query returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultShape {
    /// Entity rows; fetch joins are honored
    #[default]
    Entity,
    /// A number (count, existence, aggregate); every traversal is a plain join
    Scalar,
}

/// Compiles query conditions into predicates
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecCompiler;

impl SpecCompiler {
    /// Compiles a condition for an entity query
    pub fn compile(condition: &QueryCondition) -> SpecResult<CompiledSpec> {
        Self::compile_for(condition, ResultShape::Entity)
    }

    /// Compiles a condition for the given result shape
    pub fn compile_for(condition: &QueryCondition, shape: ResultShape) -> SpecResult<CompiledSpec> {
        match Self::build(condition, shape) {
            Ok(spec) => {
                debug!(
                    event = %Event::CompileComplete,
                    comparisons = spec.predicate.comparisons().len(),
                    traversals = spec.traversals.len(),
                    skipped = spec.skipped_parameters,
                    fetches = spec.fetches(),
                    "condition compiled"
                );
                Ok(spec)
            }
            Err(err) => {
                warn!(event = %Event::CompileRejected, code = %err.code(), "{}", err.message());
                Err(err)
            }
        }
    }

    fn build(condition: &QueryCondition, shape: ResultShape) -> SpecResult<CompiledSpec> {
        let mut state = CompileState::default();

        let root = state.group_clause(condition.filter(), Source::Root)?;

        let force_join = condition.suppress_fetch || shape == ResultShape::Scalar;
        for join in condition.joins() {
            let mode = if force_join || !join.fetch() {
                TraversalMode::Join
            } else {
                TraversalMode::Fetch
            };
            state.visit(join, None, mode)?;
        }

        let all_and = Predicate::all(std::mem::take(&mut state.join_and));
        let all_or = Predicate::any(std::mem::take(&mut state.join_or));
        let inner = Predicate::all(all_and.into_iter().chain(all_or));

        let predicate = Predicate::all(root.into_iter().chain(inner)).unwrap_or(Predicate::Always);

        Ok(CompiledSpec {
            predicate,
            traversals: state.traversals,
            distinct: condition.distinct,
            skipped_parameters: state.skipped,
        })
    }
}

#[derive(Default)]
struct CompileState {
    traversals: Vec<Traversal>,
    join_and: Vec<Predicate>,
    join_or: Vec<Predicate>,
    skipped: usize,
}

impl CompileState {
    /// Registers a traversal and its subtree, collecting join clauses
    fn visit(
        &mut self,
        join: &JoinSpec,
        parent: Option<JoinId>,
        mode: TraversalMode,
    ) -> SpecResult<()> {
        let id = self.traversals.len();
        self.traversals.push(Traversal {
            id,
            parent,
            attribute: join.key().to_string(),
            kind: join.kind(),
            mode,
        });

        let filter = join.filter();
        let source = Source::Join(id);
        if let Some(clause) = self.clause(&filter.parameters, source, |p| Predicate::all(p))? {
            self.join_and.push(clause);
        }
        if let Some(or_group) = filter.or_group() {
            if let Some(clause) = self.clause(&or_group.parameters, source, |p| Predicate::any(p))? {
                self.join_or.push(clause);
            }
        }

        for child in join.children() {
            self.visit(child, Some(id), mode)?;
        }
        Ok(())
    }

    /// AND clause of a group, ANDed with the OR clause of its OR group.
    ///
    /// The OR group's own OR group is not consulted.
    fn group_clause(&mut self, group: &FilterGroup, source: Source) -> SpecResult<Option<Predicate>> {
        let and_clause = self.clause(&group.parameters, source, |p| Predicate::all(p))?;
        let or_clause = match group.or_group() {
            Some(or_group) => self.clause(&or_group.parameters, source, |p| Predicate::any(p))?,
            None => None,
        };
        Ok(Predicate::all(and_clause.into_iter().chain(or_clause)))
    }

    fn clause(
        &mut self,
        parameters: &[ConditionParameter],
        source: Source,
        combine: fn(Vec<Predicate>) -> Option<Predicate>,
    ) -> SpecResult<Option<Predicate>> {
        let mut predicates = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            if parameter.is_skipped() {
                self.skipped += 1;
                trace!(
                    event = %Event::ParameterSkipped,
                    path = %parameter.path,
                    operator = %parameter.operator,
                    "null value, parameter skipped"
                );
                continue;
            }
            predicates.push(compile_parameter(parameter, source)?);
        }
        Ok(combine(predicates))
    }
}

/// Compiles one parameter into its comparison
pub(crate) fn compile_parameter(
    parameter: &ConditionParameter,
    source: Source,
) -> SpecResult<Predicate> {
    split_path(&parameter.path)?;
    let operator = parameter.operator;
    let value = &parameter.value;
    value
        .check_shape(operator.expected_shape())
        .map_err(|reason| SpecError::invalid_value(&parameter.path, operator, reason))?;

    let attr = AttributeRef {
        source,
        path: parameter.path.clone(),
    };
    let plain = || Operand::Attribute(attr.clone());
    let size = || Operand::Size(attr.clone());
    let like = |pattern: String| {
        if operator.is_ignore_case() {
            Comparison::Like {
                operand: Operand::Lower(attr.clone()),
                pattern: pattern.to_lowercase(),
            }
        } else {
            Comparison::Like {
                operand: plain(),
                pattern,
            }
        }
    };
    let text = value.to_text();

    let comparison = match operator {
        Operator::Equals => Comparison::Equal {
            operand: plain(),
            value: value.clone(),
        },
        Operator::NotEquals => Comparison::NotEqual {
            operand: plain(),
            value: value.clone(),
        },
        Operator::Like
        | Operator::LikeIgnoreCase
        | Operator::Contains
        | Operator::ContainsIgnoreCase => like(format!("%{}%", text)),
        Operator::StartsWith | Operator::StartsWithIgnoreCase => like(format!("{}%", text)),
        Operator::EndsWith | Operator::EndsWithIgnoreCase => like(format!("%{}", text)),
        Operator::NotContains | Operator::NotContainsIgnoreCase => {
            return Ok(Predicate::from(like(format!("%{}%", text))).negate());
        }
        Operator::GreaterThan | Operator::GreaterThanTime => Comparison::GreaterThan {
            operand: plain(),
            value: value.clone(),
        },
        Operator::GreaterEquals | Operator::GreaterEqualsTime => Comparison::GreaterEquals {
            operand: plain(),
            value: value.clone(),
        },
        Operator::LessThan | Operator::LessThanTime => Comparison::LessThan {
            operand: plain(),
            value: value.clone(),
        },
        Operator::LessEquals | Operator::LessEqualsTime => Comparison::LessEquals {
            operand: plain(),
            value: value.clone(),
        },
        Operator::In | Operator::NotIn => {
            let comparison = Comparison::In {
                operand: plain(),
                values: value.as_list().map(<[ConditionValue]>::to_vec).unwrap_or_default(),
            };
            if operator == Operator::NotIn {
                return Ok(Predicate::from(comparison).negate());
            }
            comparison
        }
        Operator::Null => Comparison::IsNull { operand: plain() },
        Operator::NotNull => Comparison::IsNotNull { operand: plain() },
        Operator::Between | Operator::NotBetween => {
            let (lower, upper) = value.as_pair().ok_or_else(|| {
                SpecError::invalid_value(&parameter.path, operator, "expected a pair")
            })?;
            let comparison = Comparison::Between {
                operand: plain(),
                lower: lower.clone(),
                upper: upper.clone(),
            };
            if operator == Operator::NotBetween {
                return Ok(Predicate::from(comparison).negate());
            }
            comparison
        }
        Operator::IsEmpty => Comparison::IsEmpty { operand: plain() },
        Operator::IsNotEmpty => Comparison::IsNotEmpty { operand: plain() },
        Operator::SizeEquals => Comparison::Equal {
            operand: size(),
            value: value.clone(),
        },
        Operator::SizeGreaterThan => Comparison::GreaterThan {
            operand: size(),
            value: value.clone(),
        },
        Operator::SizeLessThan => Comparison::LessThan {
            operand: size(),
            value: value.clone(),
        },
        Operator::SizeGreaterEquals => Comparison::GreaterEquals {
            operand: size(),
            value: value.clone(),
        },
        Operator::SizeLessEquals => Comparison::LessEquals {
            operand: size(),
            value: value.clone(),
        },
    };
    Ok(comparison.into())
}
