//! Validation layer for storylet definitions.
//!
//! This module provides offline (load-time) checks for authored storylets,
//! catching malformed data before a director ever touches it (§7).

use std::collections::HashSet;
use thiserror::Error;

use narrator_core::PathResolver;

use crate::{ConditionOp, Effect, Precondition, Scope, Storylet, TargetKind};

/// A single validation failure for a storylet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryletValidationError {
    /// Storylet id is empty.
    #[error("storylet id is empty")]
    MissingId,
    /// Storylet title is empty.
    #[error("storylet '{id}' has an empty title")]
    MissingTitle { id: String },
    /// Weight must be non-negative (§4.6 stage 7 treats weight as a raw selection weight).
    #[error("storylet '{id}' has a negative weight {value}")]
    NegativeWeight { id: String, value: f64 },
    /// `intensity_delta` is outside `[-1, 1]`.
    #[error("storylet '{id}' has intensity_delta {value} outside [-1, 1]")]
    InvalidIntensityDelta { id: String, value: f64 },
    /// A precondition's path failed to parse.
    #[error("storylet '{id}' has a malformed precondition path '{path}': {reason}")]
    MalformedConditionPath {
        id: String,
        path: String,
        reason: String,
    },
    /// A precondition's `scope` disagrees with its path's namespace prefix.
    #[error("storylet '{id}' precondition path '{path}' does not match declared scope")]
    ConditionScopeMismatch { id: String, path: String },
    /// A `has_tag`/`lacks_tag` condition's value was not a string.
    #[error("storylet '{id}' condition on '{path}' requires a text value for {op}")]
    ConditionValueMismatch {
        id: String,
        path: String,
        op: ConditionOp,
    },
    /// An effect's path failed to parse.
    #[error("storylet '{id}' has a malformed effect path '{path}': {reason}")]
    MalformedEffectPath {
        id: String,
        path: String,
        reason: String,
    },
    /// An effect's `scope` disagrees with its path's namespace prefix.
    #[error("storylet '{id}' effect path '{path}' does not match declared scope")]
    EffectScopeMismatch { id: String, path: String },
    /// An effect's declared `target` is incompatible with its `op`.
    #[error("storylet '{id}' effect on '{path}' declares target {declared:?} but op {op:?} requires {required:?}")]
    EffectTargetMismatch {
        id: String,
        path: String,
        op: String,
        declared: TargetKind,
        required: TargetKind,
    },
    /// `requires_fired`/`forbids_fired` both name the same storylet id.
    #[error("storylet '{id}' both requires and forbids its own firing of '{other}'")]
    ContradictoryFiringConstraint { id: String, other: String },
    /// A `requires_fired`/`forbids_fired` entry names a storylet id not present in the batch.
    #[error("storylet '{id}' references unknown storylet id '{other}'")]
    UnknownFiringReference { id: String, other: String },
}

fn check_scope_agreement(scope: Scope, path: &str) -> bool {
    path.starts_with(scope.prefix())
}

fn validate_precondition(
    id: &str,
    precondition: &Precondition,
    errors: &mut Vec<StoryletValidationError>,
) {
    let Precondition::Typed(cond) = precondition else {
        return;
    };
    match PathResolver::parse(&cond.path) {
        Ok(_) => {}
        Err(e) => {
            errors.push(StoryletValidationError::MalformedConditionPath {
                id: id.to_string(),
                path: cond.path.clone(),
                reason: e.0,
            });
            return;
        }
    }
    if !check_scope_agreement(cond.scope, &cond.path) {
        errors.push(StoryletValidationError::ConditionScopeMismatch {
            id: id.to_string(),
            path: cond.path.clone(),
        });
    }
    if matches!(cond.op, ConditionOp::HasTag | ConditionOp::LacksTag)
        && !matches!(cond.value, narrator_core::Scalar::Text(_))
    {
        errors.push(StoryletValidationError::ConditionValueMismatch {
            id: id.to_string(),
            path: cond.path.clone(),
            op: cond.op,
        });
    }
}

fn validate_effect(id: &str, effect: &Effect, errors: &mut Vec<StoryletValidationError>) {
    match PathResolver::parse(&effect.path) {
        Ok(_) => {}
        Err(e) => {
            errors.push(StoryletValidationError::MalformedEffectPath {
                id: id.to_string(),
                path: effect.path.clone(),
                reason: e.0,
            });
            return;
        }
    }
    if !check_scope_agreement(effect.scope, &effect.path) {
        errors.push(StoryletValidationError::EffectScopeMismatch {
            id: id.to_string(),
            path: effect.path.clone(),
        });
    }
    let required = effect.op.required_target();
    let compatible = match (effect.target, required) {
        (TargetKind::Any, _) => true,
        (declared, required) => declared == required,
    };
    if !compatible {
        errors.push(StoryletValidationError::EffectTargetMismatch {
            id: id.to_string(),
            path: effect.path.clone(),
            op: format!("{:?}", effect.op),
            declared: effect.target,
            required,
        });
    }
}

/// Validate one storylet in isolation (does not check cross-storylet references).
pub fn validate_storylet(storylet: &Storylet) -> Vec<StoryletValidationError> {
    let mut errors = Vec::new();

    if storylet.id.trim().is_empty() {
        errors.push(StoryletValidationError::MissingId);
    }
    if storylet.title.trim().is_empty() {
        errors.push(StoryletValidationError::MissingTitle {
            id: storylet.id.clone(),
        });
    }
    if storylet.weight < 0.0 {
        errors.push(StoryletValidationError::NegativeWeight {
            id: storylet.id.clone(),
            value: storylet.weight,
        });
    }
    if !(-1.0..=1.0).contains(&storylet.intensity_delta) {
        errors.push(StoryletValidationError::InvalidIntensityDelta {
            id: storylet.id.clone(),
            value: storylet.intensity_delta,
        });
    }
    for precondition in &storylet.preconditions {
        validate_precondition(&storylet.id, precondition, &mut errors);
    }
    for effect in &storylet.effects {
        validate_effect(&storylet.id, effect, &mut errors);
    }
    for other in &storylet.requires_fired {
        if storylet.forbids_fired.contains(other) {
            errors.push(StoryletValidationError::ContradictoryFiringConstraint {
                id: storylet.id.clone(),
                other: other.clone(),
            });
        }
    }

    errors
}

/// Validate a batch of storylets together, including cross-references between
/// `requires_fired`/`forbids_fired` and the ids present in the batch.
pub fn validate_storylets(
    storylets: &[Storylet],
) -> std::collections::BTreeMap<String, Vec<StoryletValidationError>> {
    let known_ids: HashSet<&str> = storylets.iter().map(|s| s.id.as_str()).collect();
    let mut by_id = std::collections::BTreeMap::new();

    for storylet in storylets {
        let mut errors = validate_storylet(storylet);
        for other in storylet.requires_fired.iter().chain(&storylet.forbids_fired) {
            if !known_ids.contains(other.as_str()) {
                errors.push(StoryletValidationError::UnknownFiringReference {
                    id: storylet.id.clone(),
                    other: other.clone(),
                });
            }
        }
        if !errors.is_empty() {
            by_id.insert(storylet.id.clone(), errors);
        }
    }

    by_id
}
