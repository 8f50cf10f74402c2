//! Append-only tick history and its derived indices (§3, §8).

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::effects::EffectDiff;
use crate::hybrid::NlEvaluationRecord;

/// Why a candidate storylet did or didn't survive each pipeline stage,
/// attached to a `TickRecord` for explainability (§4.6, §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRationale {
    /// Storylet ids considered before any filtering.
    pub candidates_considered: Vec<String>,
    /// Ids remaining after precondition filtering (stage 1).
    pub eligible_after_preconditions: Vec<String>,
    /// Ids remaining after ordering-constraint filtering (stage 2).
    pub eligible_after_ordering: Vec<String>,
    /// Ids remaining after cooldown/once filtering (stage 3).
    pub eligible_after_cooldown: Vec<String>,
    /// Ids remaining after the fallback check (stage 4).
    pub eligible_after_fallback_check: Vec<String>,
    /// Effective weight after the diversity penalty (stage 5), per id.
    pub diversity_adjusted_weights: BTreeMap<String, f64>,
    /// Effective weight after the pacing adjustment (stage 6), per id.
    pub pacing_adjusted_weights: BTreeMap<String, f64>,
    /// The exponential sampling key drawn for each surviving candidate (stage 7).
    pub sampling_keys: BTreeMap<String, f64>,
    /// Human-readable rejection reason for every id that didn't survive to
    /// the final candidate set, keyed by id.
    pub rejection_reasons: BTreeMap<String, String>,
}

/// One storylet fired during a tick, in the order its effects were applied
/// (§4.6 stages 7-8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedStorylet {
    /// The storylet's id.
    pub storylet_id: String,
    /// Whether this storylet fired as a fallback (§4.6 stage 4, §3 idle
    /// bookkeeping); a tick whose only firings are fallbacks still counts as
    /// idle for `idle_tick_count`.
    pub is_fallback: bool,
}

/// One tick's complete, reproducible record (§3, §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickRecord {
    /// 0-based, strictly increasing tick index (§8 invariant 2).
    pub tick_index: u64,
    /// Wall-clock time the tick was executed, Unix seconds. Metadata only —
    /// not part of the determinism invariant (§8 invariant 1), which covers
    /// the decision-bearing fields: selection, effects, and rationale.
    pub timestamp: u64,
    /// The storylets selected this tick, in ascending sampling-key order —
    /// the order their effects were applied in. Empty if the tick was idle.
    pub selected: Vec<SelectedStorylet>,
    /// Full rationale for why these storylets (or none) were selected.
    pub rationale: SelectionRationale,
    /// The effects applied, in order, across every selected storylet.
    pub effect_diffs: Vec<EffectDiffRecord>,
    /// World intensity immediately before this tick.
    pub intensity_before: f64,
    /// World intensity immediately after this tick.
    pub intensity_after: f64,
    /// The per-tick RNG seed this tick drew from (`DeterministicRng::for_tick`).
    pub rng_seed_used: u64,
    /// Canonical-JSON content hash of the world state immediately before this tick.
    pub state_before_hash: String,
    /// Canonical-JSON content hash of the world state immediately after this tick.
    pub state_after_hash: String,
    /// Consecutive idle ticks (no non-fallback storylet fired) ending at and
    /// including this tick.
    pub idle_tick_count_after: u64,
    /// Every natural-language judge call made while selecting this tick's
    /// storylets, in the order they occurred.
    pub nl_evaluations: Vec<NlEvaluationRecord>,
}

impl TickRecord {
    /// Whether no storylet fired this tick.
    pub fn is_idle(&self) -> bool {
        self.selected.is_empty()
    }
}

/// A serializable form of [`crate::effects::EffectDiff`] (`Scalar` already
/// derives `Serialize`/`Deserialize`, this just names the record-level shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDiffRecord {
    /// The path that was mutated.
    pub path: String,
    /// The value before the effect, if the path existed.
    pub before: Option<narrator_core::Scalar>,
    /// The value after the effect.
    pub after: narrator_core::Scalar,
    /// The effect's author-facing note, if any.
    pub reason: Option<String>,
}

impl From<EffectDiff> for EffectDiffRecord {
    fn from(diff: EffectDiff) -> Self {
        EffectDiffRecord {
            path: diff.path,
            before: diff.before,
            after: diff.after,
            reason: diff.reason,
        }
    }
}

/// The append-only log of every tick a `Director` has run, plus indices
/// derived from it for cheap cooldown/once/idle lookups (§3, §8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickHistory {
    records: Vec<TickRecord>,
    last_triggered: HashMap<String, u64>,
    fired_ever: HashSet<String>,
    idle_streak: u64,
}

impl TickHistory {
    /// An empty history, as at the start of a thread.
    pub fn new() -> Self {
        TickHistory::default()
    }

    /// Append a new record, updating derived indices. The caller is
    /// responsible for ensuring `record.tick_index` is exactly one more than
    /// the previous record's (§8 invariant 2); this is enforced by `Director`.
    ///
    /// `idle_streak` only resets when at least one *non-fallback* storylet
    /// fired this tick (§3, §4.6 stage 9); a tick that fires only fallback
    /// storylets still counts as idle.
    pub fn push(&mut self, record: TickRecord) {
        let mut any_non_fallback = false;
        for selected in &record.selected {
            self.last_triggered
                .insert(selected.storylet_id.clone(), record.tick_index);
            self.fired_ever.insert(selected.storylet_id.clone());
            any_non_fallback |= !selected.is_fallback;
        }
        if any_non_fallback {
            self.idle_streak = 0;
        } else {
            self.idle_streak += 1;
        }
        self.records.push(record);
    }

    /// All recorded ticks, in order.
    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no ticks have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The tick index `storylet_id` last fired at, if ever.
    pub fn last_triggered(&self, storylet_id: &str) -> Option<u64> {
        self.last_triggered.get(storylet_id).copied()
    }

    /// Whether `storylet_id` has ever fired.
    pub fn fired_ever(&self, storylet_id: &str) -> bool {
        self.fired_ever.contains(storylet_id)
    }

    /// Current number of consecutive idle ticks ending at the most recent tick.
    pub fn idle_tick_count(&self) -> u64 {
        self.idle_streak
    }

    /// The most recent `n` tick records, most recent last.
    pub fn recent(&self, n: usize) -> &[TickRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Look up a specific tick by index, for `replay`/`explain`.
    pub fn get(&self, tick_index: u64) -> Option<&TickRecord> {
        self.records
            .iter()
            .find(|r| r.tick_index == tick_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tick_index: u64, selected: &[(&str, bool)]) -> TickRecord {
        TickRecord {
            tick_index,
            timestamp: 0,
            selected: selected
                .iter()
                .map(|(id, is_fallback)| SelectedStorylet {
                    storylet_id: id.to_string(),
                    is_fallback: *is_fallback,
                })
                .collect(),
            rationale: SelectionRationale::default(),
            effect_diffs: vec![],
            intensity_before: 0.5,
            intensity_after: 0.5,
            rng_seed_used: 0,
            state_before_hash: String::new(),
            state_after_hash: String::new(),
            idle_tick_count_after: 0,
            nl_evaluations: vec![],
        }
    }

    #[test]
    fn tracks_last_triggered_and_fired_ever() {
        let mut history = TickHistory::new();
        history.push(record(0, &[("a", false)]));
        history.push(record(1, &[]));
        history.push(record(2, &[("a", false)]));

        assert_eq!(history.last_triggered("a"), Some(2));
        assert!(history.fired_ever("a"));
        assert!(!history.fired_ever("b"));
    }

    #[test]
    fn idle_streak_resets_on_non_fallback_firing() {
        let mut history = TickHistory::new();
        history.push(record(0, &[]));
        history.push(record(1, &[]));
        assert_eq!(history.idle_tick_count(), 2);
        history.push(record(2, &[("a", false)]));
        assert_eq!(history.idle_tick_count(), 0);
        history.push(record(3, &[]));
        assert_eq!(history.idle_tick_count(), 1);
    }

    #[test]
    fn idle_streak_does_not_reset_on_fallback_only_firing() {
        let mut history = TickHistory::new();
        history.push(record(0, &[]));
        history.push(record(1, &[]));
        assert_eq!(history.idle_tick_count(), 2);
        history.push(record(2, &[("ambient", true)]));
        assert_eq!(history.idle_tick_count(), 3);
        assert!(history.fired_ever("ambient"));
    }

    #[test]
    fn get_looks_up_by_tick_index() {
        let mut history = TickHistory::new();
        history.push(record(0, &[("a", false)]));
        history.push(record(1, &[("b", false)]));
        assert_eq!(
            history.get(1).unwrap().selected[0].storylet_id,
            "b".to_string()
        );
        assert!(history.get(5).is_none());
    }
}
