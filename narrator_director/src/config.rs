//! Director configuration (§3).
//!
//! Mirrors the teacher's pattern of grouping tunables into small nested
//! structs with their own `Default` impls, rather than one flat bag of fields.

use serde::{Deserialize, Serialize};

use crate::hybrid::EvaluationMode;

/// Master configuration for a `Director`. Immutable for the lifetime of a run;
/// changing it means starting a new thread with a fresh `rng_seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorConfig {
    /// The seed all per-tick RNGs are derived from (§9).
    pub rng_seed: u64,

    /// How many storylets stage 7 draws per tick, via `min(events_per_tick,
    /// |candidates|)`. `0` is allowed and yields an idle tick.
    pub events_per_tick: u64,

    /// How natural-language preconditions are evaluated.
    pub evaluation_mode: EvaluationMode,

    /// Diversity-penalty tuning for stage 5.
    pub diversity: DiversityConfig,

    /// Pacing tuning for stage 6.
    pub pacing: PacingConfig,

    /// Fallback storylet eligibility tuning for stage 4.
    pub fallback: FallbackConfig,
}

impl DirectorConfig {
    /// Sensible defaults for a new project.
    pub fn new(rng_seed: u64) -> Self {
        DirectorConfig {
            rng_seed,
            events_per_tick: 1,
            evaluation_mode: EvaluationMode::Deterministic,
            diversity: DiversityConfig::default(),
            pacing: PacingConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }

    /// A config tuned for fast, fully offline tests: deterministic mode, a
    /// short idle threshold so fallback storylets are easy to exercise.
    pub fn for_testing() -> Self {
        DirectorConfig {
            rng_seed: 42,
            events_per_tick: 1,
            evaluation_mode: EvaluationMode::Deterministic,
            diversity: DiversityConfig::default(),
            pacing: PacingConfig::default(),
            fallback: FallbackConfig { idle_tick_threshold: 2 },
        }
    }
}

/// Tuning for the stage-5 repetition/diversity penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiversityConfig {
    /// How many of the most recent ticks are considered "recent" for the
    /// tag-repetition penalty.
    pub window: usize,
    /// Per-occurrence multiplicative penalty in `[0, 1]`: a candidate's weight
    /// is multiplied by `(1 - diversity_penalty)^k`, where `k` is the total
    /// number of times its tags appeared across the recent window.
    pub diversity_penalty: f64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        DiversityConfig {
            window: 5,
            diversity_penalty: 0.15,
        }
    }
}

/// The narrative intensity a `PacingConfig` steers a thread toward (§4.6 stage 6).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingPreference {
    /// Target intensity `0.3`.
    Calm,
    /// Target intensity `0.5`.
    Balanced,
    /// Target intensity `0.7`.
    Intense,
}

impl PacingPreference {
    /// The target intensity this preference steers toward.
    pub fn target(self) -> f64 {
        match self {
            PacingPreference::Calm => 0.3,
            PacingPreference::Balanced => 0.5,
            PacingPreference::Intense => 0.7,
        }
    }
}

/// Tuning for the stage-6 pacing adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// The narrative intensity this thread steers toward.
    pub pacing_preference: PacingPreference,
    /// How strongly `sign(target - current_intensity)` scales a candidate's
    /// weight via its `intensity_delta` (§4.6 stage 6, normative formula).
    pub pacing_scale: f64,
    /// How strongly intensity decays toward the neutral midpoint (0.5) every
    /// tick, applied after a storylet's `intensity_delta` (or on its own, for
    /// an idle tick). `0` disables decay entirely.
    pub intensity_decay: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            pacing_preference: PacingPreference::Balanced,
            pacing_scale: 0.5,
            intensity_decay: 0.05,
        }
    }
}

/// Tuning for the stage-4 fallback check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// Number of consecutive idle ticks (no non-fallback storylet fired)
    /// before `is_fallback` storylets become eligible.
    pub idle_tick_threshold: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        FallbackConfig {
            idle_tick_threshold: 3,
        }
    }
}
