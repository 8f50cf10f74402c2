//! Orchestrates typed and natural-language condition evaluation per the
//! configured evaluation mode (§4.3, §4.4).

use serde::{Deserialize, Serialize};

use narrator_core::StateStore;
use narrator_storylets::{Precondition, Storylet};

use crate::condition::{ConditionEvaluator, ConditionResult};
use crate::judge::{JudgeCache, NLJudge};

/// How a `HybridEvaluator` treats natural-language preconditions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Natural-language preconditions are never satisfied and the judge is
    /// never called, keeping a run fully reproducible offline.
    Deterministic,
    /// The judge is consulted for natural-language preconditions; a judge
    /// failure is treated as "unsatisfied" rather than aborting the tick.
    /// Typed conditions are still evaluated locally.
    AiAssisted,
    /// Every precondition, typed or natural-language, is delegated to the
    /// judge; typed conditions are serialized to their natural-language form
    /// before submission. A judge failure propagates as a hard error instead
    /// of silently failing the condition.
    AiPrimary,
}

/// The outcome of evaluating every precondition on a storylet.
#[derive(Debug, Clone)]
pub struct EligibilityResult {
    /// Whether every precondition was satisfied.
    pub eligible: bool,
    /// Per-precondition reasons, in author order, for explainability (§4.2, §4.4).
    pub reasons: Vec<String>,
}

/// One natural-language condition evaluation performed during a tick,
/// surfaced on its `TickRecord` for audit (§3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlEvaluationRecord {
    /// The natural-language text submitted to the judge (a storylet's
    /// `nl_text`, or a typed condition serialized via `to_nl_text`).
    pub condition_text: String,
    /// Whether the judge considered the condition satisfied.
    pub satisfied: bool,
    /// The judge's confidence in the verdict, in `[0, 1]`.
    pub confidence: f64,
    /// The judge's rationale.
    pub reason: String,
    /// Whether this verdict was served from the memoization cache.
    pub cache_hit: bool,
}

/// Evaluates a storylet's preconditions using [`ConditionEvaluator`] for typed
/// conditions and an [`NLJudge`] (with memoization) for natural-language ones.
pub struct HybridEvaluator<'a> {
    mode: EvaluationMode,
    condition_evaluator: ConditionEvaluator,
    judge: &'a dyn NLJudge,
    cache: JudgeCache,
    nl_evaluations: Vec<NlEvaluationRecord>,
}

impl<'a> HybridEvaluator<'a> {
    /// Build a new evaluator. The judge cache starts empty and does not
    /// survive a reload of the owning `Project` (§9 Open Question).
    pub fn new(mode: EvaluationMode, judge: &'a dyn NLJudge) -> Self {
        HybridEvaluator {
            mode,
            condition_evaluator: ConditionEvaluator::new(),
            judge,
            cache: JudgeCache::new(),
            nl_evaluations: Vec::new(),
        }
    }

    /// Number of entries currently memoized in the judge cache.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Every judge call made so far, in the order they occurred.
    pub fn nl_evaluations(&self) -> &[NlEvaluationRecord] {
        &self.nl_evaluations
    }

    /// Take ownership of the judge-call log accumulated so far, for
    /// attaching to a `TickRecord`, leaving the evaluator's log empty.
    pub fn take_nl_evaluations(&mut self) -> Vec<NlEvaluationRecord> {
        std::mem::take(&mut self.nl_evaluations)
    }

    /// Evaluate every precondition on `storylet` against `state`. Short-circuits
    /// at the first unsatisfied precondition; `reasons` still reports every
    /// precondition evaluated up to and including that point (§4.2 stage 1).
    pub fn evaluate(
        &mut self,
        storylet: &Storylet,
        state: &StateStore,
    ) -> Result<EligibilityResult, String> {
        let mut reasons = Vec::with_capacity(storylet.preconditions.len());

        for precondition in &storylet.preconditions {
            let result = match precondition {
                Precondition::Typed(typed) => {
                    if self.mode == EvaluationMode::AiPrimary {
                        self.evaluate_nl(&typed.to_nl_text(), state)?
                    } else {
                        self.condition_evaluator.evaluate(typed, state)
                    }
                }
                Precondition::Nl(nl) => self.evaluate_nl(&nl.nl_text, state)?,
            };
            let satisfied = result.is_satisfied();
            if let ConditionResult::Unsatisfied { reason } = result {
                reasons.push(reason);
            } else {
                reasons.push("satisfied".to_string());
            }
            if !satisfied {
                return Ok(EligibilityResult {
                    eligible: false,
                    reasons,
                });
            }
        }

        Ok(EligibilityResult {
            eligible: true,
            reasons,
        })
    }

    fn evaluate_nl(&mut self, text: &str, state: &StateStore) -> Result<ConditionResult, String> {
        match self.mode {
            EvaluationMode::Deterministic => Ok(ConditionResult::Unsatisfied {
                reason: "natural-language conditions are disabled in deterministic mode"
                    .to_string(),
            }),
            EvaluationMode::AiAssisted => {
                match self.judge_with_cache(text, state) {
                    Ok(verdict) => Ok(if verdict.satisfied {
                        ConditionResult::Satisfied
                    } else {
                        ConditionResult::Unsatisfied {
                            reason: verdict.rationale,
                        }
                    }),
                    Err(_) => Ok(ConditionResult::Unsatisfied {
                        reason: format!("judge unavailable for '{text}'"),
                    }),
                }
            }
            EvaluationMode::AiPrimary => {
                let verdict = self.judge_with_cache(text, state)?;
                Ok(if verdict.satisfied {
                    ConditionResult::Satisfied
                } else {
                    ConditionResult::Unsatisfied {
                        reason: verdict.rationale,
                    }
                })
            }
        }
    }

    fn judge_with_cache(
        &mut self,
        text: &str,
        state: &StateStore,
    ) -> Result<crate::judge::JudgeVerdict, String> {
        let key = JudgeCache::key(text, state);
        if let Some(cached) = self.cache.get(&key) {
            let verdict = cached.clone();
            self.nl_evaluations.push(NlEvaluationRecord {
                condition_text: text.to_string(),
                satisfied: verdict.satisfied,
                confidence: verdict.confidence,
                reason: verdict.rationale.clone(),
                cache_hit: true,
            });
            return Ok(verdict);
        }
        let verdict = self.judge.judge(text, state)?;
        self.cache.insert(key, verdict.clone());
        self.nl_evaluations.push(NlEvaluationRecord {
            condition_text: text.to_string(),
            satisfied: verdict.satisfied,
            confidence: verdict.confidence,
            reason: verdict.rationale.clone(),
            cache_hit: false,
        });
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{JudgeVerdict, StubJudge};
    use narrator_storylets::{ConditionOp, NlCondition, Scope, TypedCondition};

    fn storylet_with_nl(text: &str) -> Storylet {
        Storylet {
            id: "s".to_string(),
            title: "S".to_string(),
            description: String::new(),
            tags: vec![],
            preconditions: vec![Precondition::Nl(NlCondition {
                nl_text: text.to_string(),
            })],
            effects: vec![],
            weight: 1.0,
            once: false,
            cooldown: 0,
            intensity_delta: 0.0,
            is_fallback: false,
            requires_fired: vec![],
            forbids_fired: vec![],
        }
    }

    #[test]
    fn deterministic_mode_rejects_nl_conditions() {
        let judge = StubJudge::new().with_default_satisfied(true);
        let mut evaluator = HybridEvaluator::new(EvaluationMode::Deterministic, &judge);
        let result = evaluator
            .evaluate(&storylet_with_nl("Mara trusts the player"), &StateStore::new())
            .unwrap();
        assert!(!result.eligible);
    }

    #[test]
    fn ai_assisted_mode_consults_judge_and_caches() {
        let judge = StubJudge::new().with_response(
            "Mara trusts the player",
            JudgeVerdict {
                satisfied: true,
                rationale: "yes".to_string(),
                confidence: 0.8,
            },
        );
        let mut evaluator = HybridEvaluator::new(EvaluationMode::AiAssisted, &judge);
        let state = StateStore::new();
        let result = evaluator
            .evaluate(&storylet_with_nl("Mara trusts the player"), &state)
            .unwrap();
        assert!(result.eligible);
        assert_eq!(evaluator.cache_len(), 1);

        // A second call with the same text/state should hit the cache, not grow it.
        evaluator
            .evaluate(&storylet_with_nl("Mara trusts the player"), &state)
            .unwrap();
        assert_eq!(evaluator.cache_len(), 1);
        assert_eq!(evaluator.nl_evaluations().len(), 2);
        assert!(!evaluator.nl_evaluations()[0].cache_hit);
        assert!(evaluator.nl_evaluations()[1].cache_hit);
    }

    #[test]
    fn ai_assisted_mode_fails_open_on_judge_error() {
        struct FailingJudge;
        impl NLJudge for FailingJudge {
            fn judge(&self, _: &str, _: &StateStore) -> Result<JudgeVerdict, String> {
                Err("unreachable".to_string())
            }
        }
        let judge = FailingJudge;
        let mut evaluator = HybridEvaluator::new(EvaluationMode::AiAssisted, &judge);
        let result = evaluator
            .evaluate(&storylet_with_nl("anything"), &StateStore::new())
            .unwrap();
        assert!(!result.eligible);
    }

    #[test]
    fn ai_primary_mode_propagates_judge_error() {
        struct FailingJudge;
        impl NLJudge for FailingJudge {
            fn judge(&self, _: &str, _: &StateStore) -> Result<JudgeVerdict, String> {
                Err("unreachable".to_string())
            }
        }
        let judge = FailingJudge;
        let mut evaluator = HybridEvaluator::new(EvaluationMode::AiPrimary, &judge);
        let result = evaluator.evaluate(&storylet_with_nl("anything"), &StateStore::new());
        assert!(result.is_err());
    }

    #[test]
    fn ai_primary_mode_routes_typed_conditions_through_the_judge() {
        let judge = StubJudge::new().with_response(
            "world.vars.tension < 70",
            JudgeVerdict {
                satisfied: true,
                rationale: "tension is low".to_string(),
                confidence: 0.95,
            },
        );
        let mut storylet = Storylet {
            id: "s".to_string(),
            title: "S".to_string(),
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
        };
        storylet.preconditions.push(Precondition::Typed(TypedCondition {
            scope: Scope::World,
            path: "world.vars.tension".to_string(),
            op: ConditionOp::Lt,
            value: narrator_core::Scalar::Number(70.0),
        }));

        // No state is set for `world.vars.tension`, so the local evaluator
        // would reject this as "not present"; under ai_primary the judge's
        // (stubbed) verdict is authoritative instead.
        let mut evaluator = HybridEvaluator::new(EvaluationMode::AiPrimary, &judge);
        let result = evaluator.evaluate(&storylet, &StateStore::new()).unwrap();
        assert!(result.eligible);
        assert_eq!(evaluator.nl_evaluations().len(), 1);
        assert_eq!(
            evaluator.nl_evaluations()[0].condition_text,
            "world.vars.tension < 70"
        );
    }

    #[test]
    fn typed_and_nl_conditions_compose() {
        let judge = StubJudge::new().with_default_satisfied(true);
        let mut evaluator = HybridEvaluator::new(EvaluationMode::AiAssisted, &judge);
        let mut storylet = storylet_with_nl("anything");
        storylet.preconditions.insert(
            0,
            Precondition::Typed(TypedCondition {
                scope: Scope::World,
                path: "world.vars.tension".to_string(),
                op: ConditionOp::Gte,
                value: narrator_core::Scalar::Number(0.0),
            }),
        );
        let mut state = StateStore::new();
        let path = narrator_core::PathResolver::parse("world.vars.tension").unwrap();
        state.set(&path, narrator_core::Scalar::Number(10.0)).unwrap();
        let result = evaluator.evaluate(&storylet, &state).unwrap();
        assert!(result.eligible);
        assert_eq!(result.reasons.len(), 2);
    }
}
