//! narrator_director: Deterministic, explainable storylet selection.
//!
//! This crate is the narrative brain: given a `StoryletLibrary` and a world
//! `StateStore`, it selects and applies one storylet per tick through a
//! nine-stage pipeline (preconditions, ordering, cooldowns, fallback,
//! diversity, pacing, weighted sampling, effect application, history
//! recording), producing a fully reproducible, rationale-annotated
//! `TickRecord` each time.

pub mod canonical;
pub mod condition;
pub mod config;
pub mod director;
pub mod effects;
pub mod errors;
pub mod history;
pub mod hybrid;
pub mod judge;
pub mod persistence;
pub mod pipeline;

pub use condition::{ConditionEvaluator, ConditionResult};
pub use config::DirectorConfig;
pub use director::Director;
pub use effects::{EffectApplier, EffectDiff};
pub use errors::DirectorError;
pub use history::{EffectDiffRecord, SelectedStorylet, SelectionRationale, TickHistory, TickRecord};
pub use hybrid::{EligibilityResult, EvaluationMode, HybridEvaluator, NlEvaluationRecord};
pub use judge::{JudgeCache, JudgeVerdict, NLJudge, StubJudge};
pub use persistence::{DirectorSnapshot, CURRENT_FORMAT_VERSION};
pub use pipeline::{SelectionOutcome, SelectionPipeline};
