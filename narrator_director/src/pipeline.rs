//! The nine-stage storylet selection pipeline (§4.6).
//!
//! Each stage narrows (or re-weights) the candidate set and records what it
//! did into a [`SelectionRationale`], so a finished tick can be explained
//! stage by stage rather than as an opaque outcome.

use std::collections::HashMap;

use narrator_core::{DeterministicRng, StateStore};
use narrator_storylets::{Storylet, StoryletLibrary};

use crate::config::DirectorConfig;
use crate::history::{SelectionRationale, TickHistory};
use crate::hybrid::HybridEvaluator;

/// A candidate's weight is never eliminated by the diversity penalty (stage
/// 5); once it would drop below this, it is clamped here instead (§4.6).
const DIVERSITY_WEIGHT_FLOOR: f64 = 1e-9;

/// The result of running the selection pipeline for one tick: which
/// storylets (if any) were chosen, in ascending sampling-key order, and the
/// full stage-by-stage rationale.
pub struct SelectionOutcome<'a> {
    /// The selected storylets, in the order their effects should be applied.
    /// Empty if every candidate was filtered out or `events_per_tick` is 0.
    pub selected: Vec<&'a Storylet>,
    /// The rationale accumulated across all nine stages.
    pub rationale: SelectionRationale,
}

/// Runs the nine-stage selection pipeline against a storylet library.
#[derive(Debug, Default)]
pub struct SelectionPipeline;

impl SelectionPipeline {
    /// Create a new pipeline. Stateless — all state lives in the arguments to
    /// `select`.
    pub fn new() -> Self {
        SelectionPipeline
    }

    /// Run stages 1 through 7 and return the selected storylets, if any.
    /// Stages 8 (effect application) and 9 (history recording) are the
    /// caller's responsibility (`Director::tick`), since they mutate state
    /// that outlives a single selection pass.
    #[allow(clippy::too_many_arguments)]
    pub fn select<'a>(
        &self,
        library: &'a StoryletLibrary,
        state: &StateStore,
        history: &TickHistory,
        config: &DirectorConfig,
        evaluator: &mut HybridEvaluator<'_>,
        rng: &mut DeterministicRng,
    ) -> SelectionOutcome<'a> {
        let mut rationale = SelectionRationale::default();
        rationale.candidates_considered = library.iter().map(|s| s.id.clone()).collect();

        // Stage 1: precondition filtering.
        let mut stage1 = Vec::new();
        for storylet in library.iter() {
            match evaluator.evaluate(storylet, state) {
                Ok(result) if result.eligible => stage1.push(storylet),
                Ok(result) => {
                    rationale.rejection_reasons.insert(
                        storylet.id.clone(),
                        result.reasons.last().cloned().unwrap_or_default(),
                    );
                }
                Err(reason) => {
                    rationale
                        .rejection_reasons
                        .insert(storylet.id.clone(), format!("judge error: {reason}"));
                }
            }
        }
        rationale.eligible_after_preconditions = stage1.iter().map(|s| s.id.clone()).collect();

        // Stage 2: ordering constraints (requires_fired / forbids_fired).
        let stage2: Vec<&Storylet> = stage1
            .into_iter()
            .filter(|storylet| {
                let ok = storylet
                    .requires_fired
                    .iter()
                    .all(|id| history.fired_ever(id))
                    && storylet
                        .forbids_fired
                        .iter()
                        .all(|id| !history.fired_ever(id));
                if !ok {
                    rationale.rejection_reasons.insert(
                        storylet.id.clone(),
                        "ordering constraint (requires_fired/forbids_fired) not satisfied"
                            .to_string(),
                    );
                }
                ok
            })
            .collect();
        rationale.eligible_after_ordering = stage2.iter().map(|s| s.id.clone()).collect();

        // Stage 3: cooldown & once.
        let stage3: Vec<&Storylet> = stage2
            .into_iter()
            .filter(|storylet| {
                if storylet.once && history.fired_ever(&storylet.id) {
                    rationale.rejection_reasons.insert(
                        storylet.id.clone(),
                        "already fired once".to_string(),
                    );
                    return false;
                }
                if let Some(last) = history.last_triggered(&storylet.id) {
                    let next_tick_index = history.len() as u64;
                    let elapsed = next_tick_index - last;
                    if elapsed <= storylet.cooldown {
                        rationale.rejection_reasons.insert(
                            storylet.id.clone(),
                            format!(
                                "cooldown not elapsed ({elapsed}/{} ticks)",
                                storylet.cooldown
                            ),
                        );
                        return false;
                    }
                }
                true
            })
            .collect();
        rationale.eligible_after_cooldown = stage3.iter().map(|s| s.id.clone()).collect();

        // Stage 4: fallback check. Non-fallback candidates are preferred; fallback
        // storylets only enter the pool once the world has been idle long enough.
        let (regular, fallback): (Vec<&Storylet>, Vec<&Storylet>) =
            stage3.into_iter().partition(|s| !s.is_fallback);
        let stage4: Vec<&Storylet> = if !regular.is_empty() {
            for s in &fallback {
                rationale
                    .rejection_reasons
                    .insert(s.id.clone(), "regular candidates available".to_string());
            }
            regular
        } else if history.idle_tick_count() >= config.fallback.idle_tick_threshold {
            fallback
        } else {
            for s in &fallback {
                rationale.rejection_reasons.insert(
                    s.id.clone(),
                    "idle threshold not yet reached".to_string(),
                );
            }
            Vec::new()
        };
        rationale.eligible_after_fallback_check = stage4.iter().map(|s| s.id.clone()).collect();

        if stage4.is_empty() {
            return SelectionOutcome {
                selected: Vec::new(),
                rationale,
            };
        }

        // Stage 5: diversity penalty — multiply weight by `(1 -
        // diversity_penalty)^k`, where `k` is the total number of times a
        // candidate's tags appeared across the last `window` ticks' selected
        // storylets' tags. Never eliminates a candidate that started with a
        // positive weight; a candidate authored with weight 0 stays excluded
        // (stage 7 drops zero-weight candidates outright).
        let mut tag_counts: HashMap<&str, u64> = HashMap::new();
        for record in history.recent(config.diversity.window) {
            for selected in &record.selected {
                if let Some(s) = library.get(&selected.storylet_id) {
                    for tag in &s.tags {
                        *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut diversity_weighted: Vec<(&Storylet, f64)> = stage4
            .into_iter()
            .map(|s| {
                let k: i32 = s
                    .tags
                    .iter()
                    .map(|t| *tag_counts.get(t.as_str()).unwrap_or(&0) as i32)
                    .sum();
                let penalized = s.weight * (1.0 - config.diversity.diversity_penalty).powi(k);
                let weight = if s.weight > 0.0 {
                    penalized.max(DIVERSITY_WEIGHT_FLOOR)
                } else {
                    0.0
                };
                rationale
                    .diversity_adjusted_weights
                    .insert(s.id.clone(), weight);
                (s, weight)
            })
            .collect();

        // Stage 6: pacing adjustment. `target` comes from `pacing_preference`;
        // `drive = target - current_intensity`. Weight is multiplied by
        // `1 + pacing_scale * sign(drive) * storylet.intensity_delta`, then
        // clamped to `>= 0` (§4.6 stage 6, normative formula).
        let target = config.pacing.pacing_preference.target();
        let current_intensity = state.world.intensity;
        let drive = target - current_intensity;
        let sign = if drive > 0.0 {
            1.0
        } else if drive < 0.0 {
            -1.0
        } else {
            0.0
        };
        for (storylet, weight) in &mut diversity_weighted {
            let adjustment = 1.0 + config.pacing.pacing_scale * sign * storylet.intensity_delta;
            *weight = (*weight * adjustment).max(0.0);
            rationale
                .pacing_adjusted_weights
                .insert(storylet.id.clone(), *weight);
        }

        // Stage 7: weighted sampling without replacement via exponential
        // keys — draw `key = -ln(u) / weight` per positive-weight candidate,
        // then take the `min(events_per_tick, |candidates|)` smallest, in
        // ascending-key order. Ties are broken by author order via a stable
        // sort (§4.6).
        let mut keyed: Vec<(&Storylet, f64)> = Vec::new();
        for (storylet, weight) in &diversity_weighted {
            if *weight <= 0.0 {
                continue;
            }
            let u = rng.gen_unit_f64().max(f64::MIN_POSITIVE);
            let key = -u.ln() / weight;
            rationale.sampling_keys.insert(storylet.id.clone(), key);
            keyed.push((storylet, key));
        }
        keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let k = (config.events_per_tick as usize).min(keyed.len());
        let selected: Vec<&Storylet> = keyed.into_iter().take(k).map(|(s, _)| s).collect();

        SelectionOutcome { selected, rationale }
    }
}
