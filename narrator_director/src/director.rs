//! The `Director` façade: ties the selection pipeline, effect applier, and
//! tick history together into the single entry point a host application
//! drives one tick at a time (§3, §8).

use narrator_core::{DeterministicRng, StateStore};
use narrator_storylets::StoryletLibrary;
use tracing::{info, warn};

use crate::canonical::content_hash;
use crate::config::DirectorConfig;
use crate::effects::EffectApplier;
use crate::errors::DirectorError;
use crate::history::{EffectDiffRecord, SelectedStorylet, TickHistory, TickRecord};
use crate::hybrid::HybridEvaluator;
use crate::judge::NLJudge;
use crate::persistence::DirectorSnapshot;
use crate::pipeline::SelectionPipeline;

/// Advances a narrative thread one tick at a time, selecting and applying
/// storylets against an evolving `StateStore` and recording every decision in
/// a `TickHistory` (§3).
pub struct Director<'a> {
    library: &'a StoryletLibrary,
    config: DirectorConfig,
    state: StateStore,
    history: TickHistory,
    judge: &'a dyn NLJudge,
    pipeline: SelectionPipeline,
    applier: EffectApplier,
}

impl<'a> Director<'a> {
    /// Start a fresh thread: empty state, empty history.
    pub fn new(library: &'a StoryletLibrary, config: DirectorConfig, judge: &'a dyn NLJudge) -> Self {
        Director {
            library,
            config,
            state: StateStore::new(),
            history: TickHistory::new(),
            judge,
            pipeline: SelectionPipeline::new(),
            applier: EffectApplier::new(),
        }
    }

    /// Start a thread from an already-populated initial state (e.g. an
    /// authored opening scene), with empty history.
    pub fn with_initial_state(
        library: &'a StoryletLibrary,
        config: DirectorConfig,
        judge: &'a dyn NLJudge,
        state: StateStore,
    ) -> Self {
        Director {
            library,
            config,
            state,
            history: TickHistory::new(),
            judge,
            pipeline: SelectionPipeline::new(),
            applier: EffectApplier::new(),
        }
    }

    /// Resume a thread from a saved snapshot, against a library/config that
    /// must match what produced the snapshot for future ticks to stay
    /// consistent with the rest of the run.
    pub fn restore(
        library: &'a StoryletLibrary,
        mut config: DirectorConfig,
        judge: &'a dyn NLJudge,
        snapshot: DirectorSnapshot,
    ) -> Self {
        config.rng_seed = snapshot.rng_seed;
        Director {
            library,
            config,
            state: snapshot.state,
            history: snapshot.history,
            judge,
            pipeline: SelectionPipeline::new(),
            applier: EffectApplier::new(),
        }
    }

    /// Snapshot the current run state for persistence (§9 SUPPLEMENT).
    pub fn snapshot(&self) -> DirectorSnapshot {
        DirectorSnapshot::new(self.state.clone(), self.history.clone(), self.config.rng_seed)
    }

    /// The current world/character/relationship state.
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// The full tick history so far.
    pub fn history(&self) -> &TickHistory {
        &self.history
    }

    /// Advance the thread by one tick: select up to `events_per_tick`
    /// storylets (stages 1-7), apply their effects atomically across all of
    /// them in ascending-key order (stage 8), and append the resulting
    /// record (stage 9). Returns the new record, or a `TickAborted` error if
    /// effect application failed partway through — in that case no record is
    /// appended and `state()` is unchanged (§4.5, §7, §8).
    pub fn tick(&mut self) -> Result<&TickRecord, DirectorError> {
        let tick_index = self.history.len() as u64;
        let mut rng = DeterministicRng::for_tick(self.config.rng_seed, tick_index);
        let mut evaluator = HybridEvaluator::new(self.config.evaluation_mode, self.judge);

        let state_before_hash = content_hash(&self.state).unwrap_or_default();
        let intensity_before = self.state.world.intensity;
        let decay_adjustment = self.config.pacing.intensity_decay * (intensity_before - 0.5);

        let outcome = self.pipeline.select(
            self.library,
            &self.state,
            &self.history,
            &self.config,
            &mut evaluator,
            &mut rng,
        );

        let mut candidate_state = self.state.deep_clone();
        let mut effect_diffs = Vec::new();
        let mut selected = Vec::with_capacity(outcome.selected.len());
        let mut total_intensity_delta = 0.0;

        for storylet in &outcome.selected {
            match self.applier.apply_all(&storylet.effects, &mut candidate_state) {
                Ok(diffs) => {
                    effect_diffs.extend(diffs.into_iter().map(EffectDiffRecord::from));
                    total_intensity_delta += storylet.intensity_delta;
                    selected.push(SelectedStorylet {
                        storylet_id: storylet.id.clone(),
                        is_fallback: storylet.is_fallback,
                    });
                    info!(tick_index, storylet_id = %storylet.id, "storylet selected and applied");
                }
                Err(e) => {
                    warn!(tick_index, storylet_id = %storylet.id, error = %e, "effect application aborted the tick");
                    return Err(DirectorError::TickAborted {
                        tick_index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        if selected.is_empty() {
            info!(tick_index, "no storylet selected; idle tick");
        }

        let any_non_fallback = selected.iter().any(|s| !s.is_fallback);
        let idle_tick_count_after = if any_non_fallback {
            0
        } else {
            self.history.idle_tick_count() + 1
        };

        candidate_state.world.intensity = (candidate_state.world.intensity
            + total_intensity_delta
            - decay_adjustment)
            .clamp(0.0, 1.0);
        self.state = candidate_state;
        let intensity_after = self.state.world.intensity;
        let state_after_hash = content_hash(&self.state).unwrap_or_default();

        let record = TickRecord {
            tick_index,
            timestamp: wall_clock_seconds(),
            selected,
            rationale: outcome.rationale,
            effect_diffs,
            intensity_before,
            intensity_after,
            rng_seed_used: self.config.rng_seed,
            state_before_hash,
            state_after_hash,
            idle_tick_count_after,
            nl_evaluations: evaluator.take_nl_evaluations(),
        };
        self.history.push(record);
        Ok(self.history.records().last().expect("just pushed"))
    }

    /// Look up a previously recorded tick for inspection (§3).
    pub fn replay(&self, tick_index: u64) -> Result<&TickRecord, DirectorError> {
        self.history
            .get(tick_index)
            .ok_or(DirectorError::TickIndexOutOfRange {
                tick_index,
                history_len: self.history.len(),
            })
    }

    /// Render a human-readable explanation of a recorded tick: what was
    /// selected (or not), and why each candidate survived or was rejected.
    pub fn explain(&self, tick_index: u64) -> Result<String, DirectorError> {
        let record = self.replay(tick_index)?;
        let mut out = String::new();
        if record.is_idle() {
            out.push_str(&format!("tick {tick_index}: idle (no storylet selected)\n"));
        } else {
            for selected in &record.selected {
                let marker = if selected.is_fallback { " (fallback)" } else { "" };
                out.push_str(&format!(
                    "tick {tick_index}: selected '{}'{marker}\n",
                    selected.storylet_id
                ));
            }
        }
        out.push_str(&format!(
            "  considered {} candidate(s); {} survived preconditions, {} survived ordering, {} survived cooldown, {} survived fallback check\n",
            record.rationale.candidates_considered.len(),
            record.rationale.eligible_after_preconditions.len(),
            record.rationale.eligible_after_ordering.len(),
            record.rationale.eligible_after_cooldown.len(),
            record.rationale.eligible_after_fallback_check.len(),
        ));
        for (id, reason) in &record.rationale.rejection_reasons {
            out.push_str(&format!("  - {id}: rejected ({reason})\n"));
        }
        for diff in &record.effect_diffs {
            let before = diff
                .before
                .as_ref()
                .map(|v| v.display())
                .unwrap_or_else(|| "<none>".to_string());
            out.push_str(&format!(
                "  effect: {} {} -> {}\n",
                diff.path,
                before,
                diff.after.display()
            ));
        }
        Ok(out)
    }
}

/// Current Unix time in seconds, used only for `TickRecord::timestamp`
/// metadata (mirrors `WorldSnapshot::from_world`'s `created_at`).
fn wall_clock_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::StubJudge;
    use narrator_storylets::{Effect, EffectOp, Scope, Storylet, TargetKind};

    fn library_with_one_firing_storylet() -> StoryletLibrary {
        StoryletLibrary::new(vec![Storylet {
            id: "greet".to_string(),
            title: "Greeting".to_string(),
            description: String::new(),
            tags: vec![],
            preconditions: vec![],
            effects: vec![Effect {
                scope: Scope::World,
                target: TargetKind::Any,
                op: EffectOp::Set,
                path: "world.vars.greeted".to_string(),
                value: narrator_core::Scalar::Bool(true),
                reason: None,
            }],
            weight: 1.0,
            once: true,
            cooldown: 0,
            intensity_delta: 0.1,
            is_fallback: false,
            requires_fired: vec![],
            forbids_fired: vec![],
        }])
    }

    #[test]
    fn tick_selects_and_applies_then_records() {
        let library = library_with_one_firing_storylet();
        let judge = StubJudge::new();
        let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);

        let record = director.tick().unwrap().clone();
        assert_eq!(record.selected.len(), 1);
        assert_eq!(record.selected[0].storylet_id, "greet");
        assert_eq!(record.tick_index, 0);
        assert!(!record.state_before_hash.is_empty());
        assert_ne!(record.state_before_hash, record.state_after_hash);
        let path = narrator_core::PathResolver::parse("world.vars.greeted").unwrap();
        assert_eq!(
            director.state().get(&path).unwrap(),
            narrator_core::Scalar::Bool(true)
        );
    }

    #[test]
    fn once_storylet_does_not_fire_a_second_tick() {
        let library = library_with_one_firing_storylet();
        let judge = StubJudge::new();
        let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);
        director.tick().unwrap();
        let record = director.tick().unwrap();
        assert!(record.selected.is_empty());
        assert_eq!(record.idle_tick_count_after, 1);
    }

    #[test]
    fn replay_and_explain_work_after_ticking() {
        let library = library_with_one_firing_storylet();
        let judge = StubJudge::new();
        let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);
        director.tick().unwrap();

        let replayed = director.replay(0).unwrap();
        assert_eq!(replayed.selected[0].storylet_id, "greet");

        let explanation = director.explain(0).unwrap();
        assert!(explanation.contains("greet"));

        assert!(director.replay(99).is_err());
    }

    #[test]
    fn snapshot_and_restore_preserve_state_and_history() {
        let library = library_with_one_firing_storylet();
        let judge = StubJudge::new();
        let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);
        director.tick().unwrap();

        let snapshot = director.snapshot();
        let restored = Director::restore(&library, DirectorConfig::for_testing(), &judge, snapshot);
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.state(), director.state());
    }

    #[test]
    fn repeated_ticks_with_same_seed_are_deterministic() {
        let library = StoryletLibrary::new(vec![
            Storylet {
                id: "a".to_string(),
                title: "A".to_string(),
                description: String::new(),
                tags: vec![],
                preconditions: vec![],
                effects: vec![],
                weight: 1.0,
                once: false,
                cooldown: 0,
                intensity_delta: 0.0,
                is_fallback: false,
                requires_fired: vec![],
                forbids_fired: vec![],
            },
            Storylet {
                id: "b".to_string(),
                title: "B".to_string(),
                description: String::new(),
                tags: vec![],
                preconditions: vec![],
                effects: vec![],
                weight: 1.0,
                once: false,
                cooldown: 0,
                intensity_delta: 0.0,
                is_fallback: false,
                requires_fired: vec![],
                forbids_fired: vec![],
            },
        ]);
        let judge = StubJudge::new();

        let run = || {
            let mut director = Director::new(&library, DirectorConfig::for_testing(), &judge);
            (0..5)
                .map(|_| {
                    director
                        .tick()
                        .unwrap()
                        .selected
                        .iter()
                        .map(|s| s.storylet_id.clone())
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn events_per_tick_draws_multiple_storylets_and_applies_in_order() {
        let library = StoryletLibrary::new(vec![
            Storylet {
                id: "a".to_string(),
                title: "A".to_string(),
                description: String::new(),
                tags: vec![],
                preconditions: vec![],
                effects: vec![Effect {
                    scope: Scope::World,
                    target: TargetKind::Any,
                    op: EffectOp::Append,
                    path: "world.vars.log".to_string(),
                    value: narrator_core::Scalar::Text("a".to_string()),
                    reason: None,
                }],
                weight: 1.0,
                once: false,
                cooldown: 0,
                intensity_delta: 0.0,
                is_fallback: false,
                requires_fired: vec![],
                forbids_fired: vec![],
            },
            Storylet {
                id: "b".to_string(),
                title: "B".to_string(),
                description: String::new(),
                tags: vec![],
                preconditions: vec![],
                effects: vec![Effect {
                    scope: Scope::World,
                    target: TargetKind::Any,
                    op: EffectOp::Append,
                    path: "world.vars.log".to_string(),
                    value: narrator_core::Scalar::Text("b".to_string()),
                    reason: None,
                }],
                weight: 1.0,
                once: false,
                cooldown: 0,
                intensity_delta: 0.0,
                is_fallback: false,
                requires_fired: vec![],
                forbids_fired: vec![],
            },
        ]);
        let judge = StubJudge::new();
        let mut config = DirectorConfig::for_testing();
        config.events_per_tick = 2;
        let mut director = Director::new(&library, config, &judge);

        let record = director.tick().unwrap();
        assert_eq!(record.selected.len(), 2);
        assert_eq!(record.effect_diffs.len(), 2);

        let path = narrator_core::PathResolver::parse("world.vars.log").unwrap();
        let log = director.state().get(&path).unwrap();
        assert_eq!(log.as_list().unwrap().len(), 2);
    }
}
