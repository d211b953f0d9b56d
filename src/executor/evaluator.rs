//! Predicate evaluation
//!
//! Evaluates a compiled predicate against one document under one join
//! binding, with SQL three-valued semantics.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use super::errors::{ExecutorError, ExecutorResult};
use super::truth::Truth;
use super::values::{as_text, compare_values, resolve_path};
use crate::compiler::{AttributeRef, Comparison, Operand, Predicate, Source};
use crate::spec::ConditionValue;

/// Evaluates predicates, caching compiled LIKE patterns
#[derive(Debug, Default)]
pub struct PredicateEvaluator {
    patterns: HashMap<String, Regex>,
}

impl PredicateEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `predicate` for `document` under `binding`
    pub fn evaluate(
        &mut self,
        predicate: &Predicate,
        document: &Value,
        binding: &[Option<&Value>],
    ) -> ExecutorResult<Truth> {
        match predicate {
            Predicate::Always => Ok(Truth::True),
            Predicate::And(members) => {
                let mut truth = Truth::True;
                for member in members {
                    truth = truth.and(self.evaluate(member, document, binding)?);
                    if truth == Truth::False {
                        break;
                    }
                }
                Ok(truth)
            }
            Predicate::Or(members) => {
                let mut truth = Truth::False;
                for member in members {
                    truth = truth.or(self.evaluate(member, document, binding)?);
                    if truth == Truth::True {
                        break;
                    }
                }
                Ok(truth)
            }
            Predicate::Not(inner) => Ok(self.evaluate(inner, document, binding)?.not()),
            Predicate::Compare(comparison) => self.compare(comparison, document, binding),
        }
    }

    fn compare(
        &mut self,
        comparison: &Comparison,
        document: &Value,
        binding: &[Option<&Value>],
    ) -> ExecutorResult<Truth> {
        let scope = Scope { document, binding };
        let truth = match comparison {
            Comparison::Equal { operand, value } => equal(scope.operand(operand), value),
            Comparison::NotEqual { operand, value } => equal(scope.operand(operand), value).not(),
            Comparison::Like { operand, pattern } => match scope.operand(operand) {
                Some(actual) => match as_text(&actual) {
                    Some(text) => self.matcher(pattern)?.is_match(&text).into(),
                    None => Truth::Unknown,
                },
                None => Truth::Unknown,
            },
            Comparison::GreaterThan { operand, value } => {
                ordering(scope.operand(operand), value, |o| o == Ordering::Greater)
            }
            Comparison::GreaterEquals { operand, value } => {
                ordering(scope.operand(operand), value, |o| o != Ordering::Less)
            }
            Comparison::LessThan { operand, value } => {
                ordering(scope.operand(operand), value, |o| o == Ordering::Less)
            }
            Comparison::LessEquals { operand, value } => {
                ordering(scope.operand(operand), value, |o| o != Ordering::Greater)
            }
            Comparison::In { operand, values } => {
                let actual = scope.operand(operand);
                values
                    .iter()
                    .fold(Truth::False, |acc, value| acc.or(equal(actual.clone(), value)))
            }
            Comparison::Between {
                operand,
                lower,
                upper,
            } => {
                let actual = scope.operand(operand);
                ordering(actual.clone(), lower, |o| o != Ordering::Less)
                    .and(ordering(actual, upper, |o| o != Ordering::Greater))
            }
            Comparison::IsNull { operand } => scope.operand(operand).is_none().into(),
            Comparison::IsNotNull { operand } => scope.operand(operand).is_some().into(),
            Comparison::IsEmpty { operand } => is_empty(scope.operand(operand).as_ref()).into(),
            Comparison::IsNotEmpty { operand } => {
                (!is_empty(scope.operand(operand).as_ref())).into()
            }
        };
        Ok(truth)
    }

    fn matcher(&mut self, pattern: &str) -> ExecutorResult<&Regex> {
        if !self.patterns.contains_key(pattern) {
            let regex = like_regex(pattern)?;
            self.patterns.insert(pattern.to_string(), regex);
        }
        self.patterns
            .get(pattern)
            .ok_or_else(|| ExecutorError::invalid_pattern(pattern, "matcher not cached"))
    }
}

/// The document and binding attribute references resolve against
#[derive(Clone, Copy)]
struct Scope<'a, 'b> {
    document: &'a Value,
    binding: &'b [Option<&'a Value>],
}

impl<'a, 'b> Scope<'a, 'b> {
    fn attribute(&self, attr: &AttributeRef) -> Option<&'a Value> {
        let base = match attr.source {
            Source::Root => Some(self.document),
            Source::Join(id) => self.binding.get(id).copied().flatten(),
        };
        base.and_then(|row| resolve_path(row, &attr.path))
            .filter(|value| !value.is_null())
    }

    /// Operand value, `None` standing for SQL NULL
    fn operand(&self, operand: &Operand) -> Option<Value> {
        match operand {
            Operand::Attribute(attr) => self.attribute(attr).cloned(),
            Operand::Lower(attr) => self.attribute(attr).map(|value| match value {
                Value::String(s) => Value::String(s.to_lowercase()),
                other => other.clone(),
            }),
            Operand::Size(attr) => match self.attribute(attr) {
                None => Some(Value::from(0)),
                Some(Value::Array(items)) => Some(Value::from(items.len())),
                Some(Value::Object(map)) => Some(Value::from(map.len())),
                Some(_) => None,
            },
        }
    }
}

fn equal(actual: Option<Value>, expected: &ConditionValue) -> Truth {
    let expected = expected.to_json();
    match actual {
        None => Truth::Unknown,
        Some(_) if expected.is_null() => Truth::Unknown,
        Some(actual) => (compare_values(&actual, &expected) == Some(Ordering::Equal)).into(),
    }
}

fn ordering(
    actual: Option<Value>,
    bound: &ConditionValue,
    accept: impl Fn(Ordering) -> bool,
) -> Truth {
    let bound = bound.to_json();
    match actual {
        None => Truth::Unknown,
        Some(actual) => match compare_values(&actual, &bound) {
            Some(order) => accept(order).into(),
            None => Truth::Unknown,
        },
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Translates a LIKE pattern into an anchored regex
fn like_regex(pattern: &str) -> ExecutorResult<Regex> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?s)^");
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|err| ExecutorError::invalid_pattern(pattern, err))
}
