//! Ordered, atomic effect application (§4.5).

use narrator_core::{MutationError, Path, PathResolver, Scalar, StateStore};
use narrator_storylets::{Effect, EffectOp};

use crate::errors::DirectorError;

/// A single applied effect, recorded for a `TickRecord`'s rationale (§3, §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDiff {
    /// The path that was mutated.
    pub path: String,
    /// The value at `path` before this effect applied.
    pub before: Option<Scalar>,
    /// The value at `path` after this effect applied.
    pub after: Scalar,
    /// The effect's author-facing note, if any.
    pub reason: Option<String>,
}

/// Applies a storylet's effects to a `StateStore` in author order.
///
/// Effect application is all-or-nothing (§4.5, §7): the first effect that
/// fails aborts the whole storylet, and the caller is expected to discard the
/// cloned state it was applying into rather than leave it partially mutated.
#[derive(Debug, Default)]
pub struct EffectApplier;

impl EffectApplier {
    /// Create a new applier. Stateless.
    pub fn new() -> Self {
        EffectApplier
    }

    /// Apply every effect in `effects` to `state`, in order, returning the
    /// per-effect diffs on success. On the first failure, returns a
    /// `DirectorError` describing which effect failed and why; `state` may
    /// have been partially mutated and must not be kept by the caller.
    pub fn apply_all(
        &self,
        effects: &[Effect],
        state: &mut StateStore,
    ) -> Result<Vec<EffectDiff>, DirectorError> {
        let mut diffs = Vec::with_capacity(effects.len());
        for effect in effects {
            diffs.push(self.apply_one(effect, state)?);
        }
        Ok(diffs)
    }

    fn apply_one(&self, effect: &Effect, state: &mut StateStore) -> Result<EffectDiff, DirectorError> {
        let path = PathResolver::parse(&effect.path)
            .map_err(|e| DirectorError::Validation(e.to_string()))?;

        let before = state.get(&path).ok();

        let mutation = match effect.op {
            EffectOp::Set => state.set(&path, effect.value.clone()),
            EffectOp::Add => {
                let delta = effect
                    .value
                    .as_number()
                    .ok_or_else(|| type_mismatch(&path, "number", effect.value.kind_name()))?;
                state.add(&path, delta)
            }
            EffectOp::Multiply => {
                let factor = effect
                    .value
                    .as_number()
                    .ok_or_else(|| type_mismatch(&path, "number", effect.value.kind_name()))?;
                state.multiply(&path, factor)
            }
            EffectOp::Append => state.append(&path, effect.value.clone()),
            EffectOp::Remove => state.remove(&path, &effect.value),
        };

        mutation.map_err(map_mutation_error)?;

        let after = state
            .get(&path)
            .map_err(|_| DirectorError::PathNotFound { path: path.clone() })?;

        Ok(EffectDiff {
            path: path.to_string(),
            before,
            after,
            reason: effect.reason.clone(),
        })
    }
}

fn type_mismatch(path: &Path, expected: &'static str, found: &'static str) -> DirectorError {
    DirectorError::TypeMismatch {
        path: path.clone(),
        expected,
        found,
    }
}

fn map_mutation_error(error: MutationError) -> DirectorError {
    match error {
        MutationError::NotFound(not_found) => DirectorError::PathNotFound {
            path: not_found.path,
        },
        MutationError::TypeMismatch {
            path,
            expected,
            found,
        } => DirectorError::TypeMismatch {
            path,
            expected,
            found,
        },
    }
}
