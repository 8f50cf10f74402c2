//! Error types for the World Director (§7).

use thiserror::Error;

use narrator_core::Path;

/// Errors that can surface from a tick, a replay, or an explain call.
#[derive(Debug, Error)]
pub enum DirectorError {
    /// A storylet or config value failed offline validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A precondition or effect addressed a path that does not exist in the
    /// world state at evaluation time.
    #[error("path not found: {path}")]
    PathNotFound { path: Path },

    /// An effect's operator is incompatible with the value stored at `path`.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: &'static str,
    },

    /// A storylet marked `once` was selected a second time; the whole tick
    /// is aborted rather than applying partial effects (§4.5, §8 invariant).
    #[error("storylet '{storylet_id}' violates its once-only constraint")]
    OnceViolation { storylet_id: String },

    /// A storylet fired before its cooldown elapsed.
    #[error("storylet '{storylet_id}' violates its cooldown constraint")]
    CooldownViolation { storylet_id: String },

    /// The natural-language judge could not be reached or returned malformed output.
    #[error("judge failure evaluating '{condition_text}': {reason}")]
    JudgeFailure {
        condition_text: String,
        reason: String,
    },

    /// A tick was aborted mid-application; no `TickRecord` was appended and the
    /// pre-tick state is unchanged (§4.5 atomicity invariant).
    #[error("tick {tick_index} aborted: {reason}")]
    TickAborted { tick_index: u64, reason: String },

    /// `replay`/`explain` was asked about a tick index outside recorded history.
    #[error("tick index {tick_index} is out of range (history has {history_len} ticks)")]
    TickIndexOutOfRange { tick_index: u64, history_len: usize },
}
