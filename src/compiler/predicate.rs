//! Predicate IR
//!
//! The backend-neutral output of the compiler: a tree of logical
//! combinators over atomic comparisons. Attribute references are rooted
//! either at the queried entity or at one of the compiled traversals.

use std::fmt;

use serde::Serialize;

use crate::spec::{ConditionValue, JoinKind};

/// Index of a traversal in `CompiledSpec::traversals`
pub type JoinId = usize;

/// Where an attribute path starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The queried entity
    Root,
    /// A joined relation
    Join(JoinId),
}

/// A dotted attribute path resolved from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRef {
    pub source: Source,
    pub path: String,
}

impl AttributeRef {
    pub fn root(path: impl Into<String>) -> Self {
        Self {
            source: Source::Root,
            path: path.into(),
        }
    }

    pub fn join(id: JoinId, path: impl Into<String>) -> Self {
        Self {
            source: Source::Join(id),
            path: path.into(),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Source::Root => write!(f, "{}", self.path),
            Source::Join(id) => write!(f, "j{}.{}", id, self.path),
        }
    }
}

/// Left-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// The attribute value
    Attribute(AttributeRef),
    /// The attribute value, lower-cased
    Lower(AttributeRef),
    /// Number of elements in a collection attribute
    Size(AttributeRef),
}

impl Operand {
    pub fn attribute(&self) -> &AttributeRef {
        match self {
            Operand::Attribute(attr) | Operand::Lower(attr) | Operand::Size(attr) => attr,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Attribute(attr) => write!(f, "{}", attr),
            Operand::Lower(attr) => write!(f, "LOWER({})", attr),
            Operand::Size(attr) => write!(f, "SIZE({})", attr),
        }
    }
}

/// Atomic comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparison {
    Equal {
        operand: Operand,
        value: ConditionValue,
    },
    NotEqual {
        operand: Operand,
        value: ConditionValue,
    },
    /// SQL LIKE: `%` matches any run, `_` any single character
    Like { operand: Operand, pattern: String },
    GreaterThan {
        operand: Operand,
        value: ConditionValue,
    },
    GreaterEquals {
        operand: Operand,
        value: ConditionValue,
    },
    LessThan {
        operand: Operand,
        value: ConditionValue,
    },
    LessEquals {
        operand: Operand,
        value: ConditionValue,
    },
    In {
        operand: Operand,
        values: Vec<ConditionValue>,
    },
    /// Inclusive on both ends
    Between {
        operand: Operand,
        lower: ConditionValue,
        upper: ConditionValue,
    },
    IsNull { operand: Operand },
    IsNotNull { operand: Operand },
    IsEmpty { operand: Operand },
    IsNotEmpty { operand: Operand },
}

impl Comparison {
    pub fn operand(&self) -> &Operand {
        match self {
            Comparison::Equal { operand, .. }
            | Comparison::NotEqual { operand, .. }
            | Comparison::Like { operand, .. }
            | Comparison::GreaterThan { operand, .. }
            | Comparison::GreaterEquals { operand, .. }
            | Comparison::LessThan { operand, .. }
            | Comparison::LessEquals { operand, .. }
            | Comparison::In { operand, .. }
            | Comparison::Between { operand, .. }
            | Comparison::IsNull { operand }
            | Comparison::IsNotNull { operand }
            | Comparison::IsEmpty { operand }
            | Comparison::IsNotEmpty { operand } => operand,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equal { operand, value } => write!(f, "{} = {}", operand, value),
            Comparison::NotEqual { operand, value } => write!(f, "{} <> {}", operand, value),
            Comparison::Like { operand, pattern } => {
                write!(f, "{} LIKE '{}'", operand, pattern.replace('\'', "''"))
            }
            Comparison::GreaterThan { operand, value } => write!(f, "{} > {}", operand, value),
            Comparison::GreaterEquals { operand, value } => write!(f, "{} >= {}", operand, value),
            Comparison::LessThan { operand, value } => write!(f, "{} < {}", operand, value),
            Comparison::LessEquals { operand, value } => write!(f, "{} <= {}", operand, value),
            Comparison::In { operand, values } => {
                write!(f, "{} IN {}", operand, ConditionValue::List(values.clone()))
            }
            Comparison::Between {
                operand,
                lower,
                upper,
            } => write!(f, "{} BETWEEN {} AND {}", operand, lower, upper),
            Comparison::IsNull { operand } => write!(f, "{} IS NULL", operand),
            Comparison::IsNotNull { operand } => write!(f, "{} IS NOT NULL", operand),
            Comparison::IsEmpty { operand } => write!(f, "{} IS EMPTY", operand),
            Comparison::IsNotEmpty { operand } => write!(f, "{} IS NOT EMPTY", operand),
        }
    }
}

/// A composable boolean restriction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches everything
    Always,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare(Comparison),
}

impl Predicate {
    /// Conjunction of the given predicates.
    ///
    /// `None` for no input, the member itself for a single input.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        Self::combine(predicates, Predicate::And)
    }

    /// Disjunction of the given predicates.
    ///
    /// `None` for no input, the member itself for a single input.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        Self::combine(predicates, Predicate::Or)
    }

    fn combine(
        predicates: impl IntoIterator<Item = Predicate>,
        build: fn(Vec<Predicate>) -> Predicate,
    ) -> Option<Predicate> {
        let mut members: Vec<Predicate> = predicates.into_iter().collect();
        match members.len() {
            0 => None,
            1 => members.pop(),
            _ => Some(build(members)),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    /// Atomic comparisons in this tree, depth-first
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Predicate::Always => {}
            Predicate::And(members) | Predicate::Or(members) => {
                for member in members {
                    member.collect_comparisons(out);
                }
            }
            Predicate::Not(inner) => inner.collect_comparisons(out),
            Predicate::Compare(comparison) => out.push(comparison),
        }
    }

    fn write_member(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(_) | Predicate::Or(_) | Predicate::Compare(_) => {
                write!(f, "({})", self)
            }
            _ => write!(f, "{}", self),
        }
    }
}

impl From<Comparison> for Predicate {
    fn from(comparison: Comparison) -> Self {
        Predicate::Compare(comparison)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => write!(f, "TRUE"),
            Predicate::And(members) | Predicate::Or(members) => {
                let separator = if matches!(self, Predicate::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", separator)?;
                    }
                    member.write_member(f)?;
                }
                Ok(())
            }
            Predicate::Not(inner) => {
                write!(f, "NOT ")?;
                inner.write_member(f)
            }
            Predicate::Compare(comparison) => write!(f, "{}", comparison),
        }
    }
}

/// Whether a traversal materializes the related data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraversalMode {
    /// Eager load: the related data is part of the result
    Fetch,
    /// Restriction only
    Join,
}

impl TraversalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalMode::Fetch => "FETCH",
            TraversalMode::Join => "JOIN",
        }
    }
}

/// One compiled relationship traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traversal {
    pub id: JoinId,
    /// Parent traversal, `None` when traversed from the root
    pub parent: Option<JoinId>,
    /// Relationship name on the parent
    pub attribute: String,
    pub kind: JoinKind,
    pub mode: TraversalMode,
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = match self.parent {
            Some(parent) => format!("j{}", parent),
            None => "root".to_string(),
        };
        write!(
            f,
            "j{}: {} {} {}.{}",
            self.id,
            self.kind,
            self.mode.as_str(),
            from,
            self.attribute
        )
    }
}

/// The output of a compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSpec {
    /// Restriction over the root entity and the traversals
    pub predicate: Predicate,
    /// Traversals in preorder; a parent always precedes its children
    pub traversals: Vec<Traversal>,
    /// Deduplicate result rows
    pub distinct: bool,
    /// Null-valued parameters left out
    pub skipped_parameters: usize,
}

impl CompiledSpec {
    /// True when any traversal eagerly loads its relation
    pub fn fetches(&self) -> bool {
        self.traversals
            .iter()
            .any(|t| t.mode == TraversalMode::Fetch)
    }

    pub fn traversal(&self, id: JoinId) -> Option<&Traversal> {
        self.traversals.get(id)
    }

    /// Dotted relationship path of a traversal from the root
    pub fn traversal_path(&self, id: JoinId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.traversals.get(id);
        while let Some(traversal) = current {
            segments.push(traversal.attribute.as_str());
            current = traversal.parent.and_then(|p| self.traversals.get(p));
        }
        if segments.is_empty() {
            return None;
        }
        segments.reverse();
        Some(segments.join("."))
    }
}
