//! Natural-language condition judging and its memoization cache (§4.3).

use std::collections::HashMap;

use narrator_core::StateStore;

use crate::canonical::content_hash;

/// A verdict from the judge for one natural-language condition.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeVerdict {
    /// Whether the judge considers the condition satisfied.
    pub satisfied: bool,
    /// A short rationale, surfaced in `TickRecord` explanations.
    pub rationale: String,
    /// The judge's confidence in this verdict, in `[0, 1]`.
    pub confidence: f64,
}

/// An external natural-language condition judge.
///
/// Implementations may call out to an LLM; test code uses [`StubJudge`] so
/// the selection pipeline can run deterministically with no external calls.
pub trait NLJudge {
    /// Evaluate `condition_text` against a human-readable summary of `state`.
    fn judge(&self, condition_text: &str, state: &StateStore) -> Result<JudgeVerdict, String>;
}

/// A deterministic test double: matches condition text against a fixed table
/// of canned verdicts, falling back to `default_satisfied` for anything else.
#[derive(Debug, Clone, Default)]
pub struct StubJudge {
    responses: HashMap<String, JudgeVerdict>,
    default_satisfied: bool,
}

impl StubJudge {
    /// A stub that is unsatisfied by default unless a specific response is registered.
    pub fn new() -> Self {
        StubJudge {
            responses: HashMap::new(),
            default_satisfied: false,
        }
    }

    /// Register a canned verdict for exact `condition_text`.
    pub fn with_response(mut self, condition_text: &str, verdict: JudgeVerdict) -> Self {
        self.responses.insert(condition_text.to_string(), verdict);
        self
    }

    /// Set the verdict returned for any condition text without a registered response.
    pub fn with_default_satisfied(mut self, satisfied: bool) -> Self {
        self.default_satisfied = satisfied;
        self
    }
}

impl NLJudge for StubJudge {
    fn judge(&self, condition_text: &str, _state: &StateStore) -> Result<JudgeVerdict, String> {
        Ok(self
            .responses
            .get(condition_text)
            .cloned()
            .unwrap_or(JudgeVerdict {
                satisfied: self.default_satisfied,
                rationale: "stub default".to_string(),
                confidence: 0.5,
            }))
    }
}

/// Content-hash-keyed memoization for judge calls, so the same `(condition
/// text, state)` pair is judged at most once per `HybridEvaluator` lifetime
/// (§4.3). The cache key hashes a canonical summary of the state, not the
/// full prompt text sent to the judge.
#[derive(Debug, Clone, Default)]
pub struct JudgeCache {
    entries: HashMap<String, JudgeVerdict>,
}

impl JudgeCache {
    /// An empty cache.
    pub fn new() -> Self {
        JudgeCache {
            entries: HashMap::new(),
        }
    }

    /// The cache key for a `(condition_text, state)` pair: a hash of the
    /// condition text plus the canonical-JSON hash of the state.
    pub fn key(condition_text: &str, state: &StateStore) -> String {
        let state_hash = content_hash(state).unwrap_or_default();
        format!("{condition_text}::{state_hash}")
    }

    /// Look up a cached verdict.
    pub fn get(&self, key: &str) -> Option<&JudgeVerdict> {
        self.entries.get(key)
    }

    /// Store a verdict under `key`.
    pub fn insert(&mut self, key: String, verdict: JudgeVerdict) {
        self.entries.insert(key, verdict);
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
