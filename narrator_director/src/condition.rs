//! Typed condition evaluation against a `StateStore` (§4.2).

use narrator_core::{Path, PathResolver, Scalar, StateStore};
use narrator_storylets::{ConditionOp, TypedCondition};

/// The outcome of evaluating a single typed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionResult {
    /// The condition holds.
    Satisfied,
    /// The condition does not hold, with a short human-readable reason.
    Unsatisfied { reason: String },
}

impl ConditionResult {
    /// Whether the condition passed.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ConditionResult::Satisfied)
    }
}

/// Evaluates [`TypedCondition`]s against a `StateStore`.
///
/// A missing path is not an error here — it simply makes the condition
/// unsatisfied, since a storylet author may legitimately gate on state that
/// hasn't been introduced yet (§4.2). Only effect application treats a missing
/// path as fatal (§4.5, §7).
#[derive(Debug, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Create a new evaluator. Stateless — kept as a type for symmetry with
    /// `HybridEvaluator` and to give call sites a stable name to depend on.
    pub fn new() -> Self {
        ConditionEvaluator
    }

    /// Evaluate one typed condition against `state`.
    pub fn evaluate(&self, condition: &TypedCondition, state: &StateStore) -> ConditionResult {
        let path = match PathResolver::parse(&condition.path) {
            Ok(path) => path,
            Err(e) => {
                return ConditionResult::Unsatisfied {
                    reason: format!("malformed path '{}': {}", condition.path, e),
                }
            }
        };

        let actual = match state.get(&path) {
            Ok(value) => value,
            Err(_) => {
                return ConditionResult::Unsatisfied {
                    reason: format!("{path} is not present"),
                }
            }
        };

        if Self::matches(&path, &actual, condition.op, &condition.value) {
            ConditionResult::Satisfied
        } else {
            ConditionResult::Unsatisfied {
                reason: format!(
                    "{path} = {} does not satisfy {} {}",
                    actual.display(),
                    condition.op,
                    condition.value.display()
                ),
            }
        }
    }

    fn matches(_path: &Path, actual: &Scalar, op: ConditionOp, expected: &Scalar) -> bool {
        match op {
            ConditionOp::Eq => actual == expected,
            ConditionOp::Ne => actual != expected,
            ConditionOp::Lt => matches!(actual.partial_cmp(expected), Some(std::cmp::Ordering::Less)),
            ConditionOp::Lte => matches!(
                actual.partial_cmp(expected),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            ConditionOp::Gt => {
                matches!(actual.partial_cmp(expected), Some(std::cmp::Ordering::Greater))
            }
            ConditionOp::Gte => matches!(
                actual.partial_cmp(expected),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            ConditionOp::In => match expected.as_list() {
                Some(items) => items.iter().any(|item| item == actual),
                None => false,
            },
            ConditionOp::NotIn => match expected.as_list() {
                Some(items) => !items.iter().any(|item| item == actual),
                None => true,
            },
            ConditionOp::Contains => match actual.as_list() {
                Some(items) => items.iter().any(|item| item == expected),
                None => false,
            },
            ConditionOp::HasTag => match (actual.as_list(), expected) {
                (Some(items), Scalar::Text(tag)) => {
                    items.iter().any(|item| matches!(item, Scalar::Text(t) if t == tag))
                }
                _ => false,
            },
            ConditionOp::LacksTag => match (actual.as_list(), expected) {
                (Some(items), Scalar::Text(tag)) => {
                    !items.iter().any(|item| matches!(item, Scalar::Text(t) if t == tag))
                }
                _ => true,
            },
        }
    }
}
