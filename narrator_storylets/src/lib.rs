//! # narrator_storylets: Authored Narrative Atoms
//!
//! This crate provides the data types for the storylet system the World Director
//! selects from: conditions, effects, and the `Storylet` definition itself.
//!
//! ## Design Philosophy
//!
//! - **Deterministic narrative**: a storylet's preconditions and effects are pure
//!   data, not code, so a run is fully reproducible from a seed and a world snapshot.
//! - **Authored as JSON**: storylets are written in JSON for human readability; the
//!   `compiler` module loads and validates an author's directory into a `StoryletLibrary`.
//!
//! ## Key Types
//!
//! - [`Storylet`]: the complete storylet definition.
//! - [`Precondition`]: a typed condition or a natural-language condition.
//! - [`Effect`]: an ordered, atomic mutation applied when a storylet fires.
//!
//! ## Validation
//!
//! See [`validation::validate_storylets`] for the offline/load-time checks in §7.
//!
//! ## Compilation
//!
//! The `compiler` module loads a directory of `.json` storylets into a
//! [`library::StoryletLibrary`], reporting duplicate ids and dangling
//! `requires_fired`/`forbids_fired` references up front.

use serde::{Deserialize, Serialize};

pub mod compiler;
pub mod errors;
pub mod library;
pub mod validation;

/// A scalar condition/effect operator's left-hand namespace, carried alongside
/// `path` purely for authoring clarity and fast validation — the actual lookup
/// always goes through `narrator_core::PathResolver`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// `world.*`
    World,
    /// `characters.*`
    Character,
    /// `relationships.*`
    Relationship,
}

impl Scope {
    /// The path prefix this scope corresponds to.
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::World => "world.",
            Scope::Character => "characters.",
            Scope::Relationship => "relationships.",
        }
    }
}

/// Operators supported by [`TypedCondition`] (§4.2).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    /// Strict equality after coercion (no cross-type equality).
    Eq,
    /// Strict inequality.
    Ne,
    /// Numeric less-than.
    Lt,
    /// Numeric less-than-or-equal.
    Lte,
    /// Numeric greater-than.
    Gt,
    /// Numeric greater-than-or-equal.
    Gte,
    /// Scalar membership in a list.
    In,
    /// Scalar non-membership in a list.
    NotIn,
    /// List membership (reverse `in`).
    Contains,
    /// Tag presence in a set of strings.
    HasTag,
    /// Tag absence in a set of strings.
    LacksTag,
}

impl std::fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConditionOp::Eq => "==",
            ConditionOp::Ne => "!=",
            ConditionOp::Lt => "<",
            ConditionOp::Lte => "<=",
            ConditionOp::Gt => ">",
            ConditionOp::Gte => ">=",
            ConditionOp::In => "in",
            ConditionOp::NotIn => "not_in",
            ConditionOp::Contains => "contains",
            ConditionOp::HasTag => "has_tag",
            ConditionOp::LacksTag => "lacks_tag",
        };
        write!(f, "{s}")
    }
}

/// A typed, operator-based precondition: `{scope, path, op, value}` (§3, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedCondition {
    /// The top-level namespace `path` addresses; must agree with `path`'s prefix.
    pub scope: Scope,
    /// A dotted path, parsed by `narrator_core::PathResolver` at evaluation time.
    pub path: String,
    /// The comparison/membership operator.
    pub op: ConditionOp,
    /// The right-hand operand (a scalar for most ops, a list for `in`/`not_in`,
    /// a string for `has_tag`/`lacks_tag`).
    pub value: narrator_core::Scalar,
}

impl TypedCondition {
    /// Render this condition as the natural-language text a judge would read,
    /// for delegating typed conditions to the judge in `ai_primary` mode (§4.4).
    pub fn to_nl_text(&self) -> String {
        format!("{} {} {}", self.path, self.op, self.value.display())
    }
}

/// A free-text precondition, delegated to the judge (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlCondition {
    /// The natural-language condition text submitted to the judge.
    pub nl_text: String,
}

/// One precondition entry: either a typed condition or a natural-language
/// condition, never both (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Precondition {
    /// `{scope, path, op, value}`
    Typed(TypedCondition),
    /// `{nl_text}`
    Nl(NlCondition),
}

/// The declared kind of value an effect's `path` is expected to hold, validated
/// against `op` at load time (§4.5's "Target kind" column).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// `set` accepts any existing shape.
    Any,
    /// `add`/`multiply` require a number.
    Number,
    /// `append` requires (or creates) a list.
    List,
    /// `remove` accepts a list or a set-shaped list (tags/traits/goals/fears).
    ListOrSet,
}

/// The mutation operators supported by the effect applier (§4.5).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectOp {
    /// Overwrite the value at `path`.
    Set,
    /// Numeric addition.
    Add,
    /// Numeric multiplication.
    Multiply,
    /// Push onto a list, no dedup.
    Append,
    /// Remove the first equal value from a list; no-op if absent.
    Remove,
}

impl EffectOp {
    /// The `TargetKind` this operator requires.
    pub fn required_target(self) -> TargetKind {
        match self {
            EffectOp::Set => TargetKind::Any,
            EffectOp::Add | EffectOp::Multiply => TargetKind::Number,
            EffectOp::Append => TargetKind::List,
            EffectOp::Remove => TargetKind::ListOrSet,
        }
    }
}

/// One ordered, atomic mutation applied when a storylet fires (§3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    /// The top-level namespace `path` addresses.
    pub scope: Scope,
    /// The declared target kind, validated against `op`.
    pub target: TargetKind,
    /// The mutation operator.
    pub op: EffectOp,
    /// A dotted path, parsed by `narrator_core::PathResolver` at apply time.
    pub path: String,
    /// The operand: the new value for `set`, the delta for `add`, the factor for
    /// `multiply`, the pushed/removed element for `append`/`remove`.
    pub value: narrator_core::Scalar,
    /// An optional author-facing note surfaced in `per_effect_diff` rationale.
    #[serde(default)]
    pub reason: Option<String>,
}

/// An authored narrative fragment: preconditions, effects, weight, and pacing
/// metadata (§3, GLOSSARY).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storylet {
    /// Unique, stable id; referenced by `requires_fired`/`forbids_fired`.
    pub id: String,
    /// Author-facing title.
    pub title: String,
    /// Author-facing description.
    #[serde(default)]
    pub description: String,
    /// Free-form tags, used by the diversity penalty (stage 5).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ordered list of preconditions; all must pass for stage 1.
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    /// Ordered list of effects, applied in author order when selected.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Non-negative raw selection weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// If true, this storylet may fire at most once ever.
    #[serde(default)]
    pub once: bool,
    /// Minimum ticks between two firings of this storylet.
    #[serde(default)]
    pub cooldown: u64,
    /// Change to narrative intensity when this storylet fires, in `[-1, 1]`.
    #[serde(default)]
    pub intensity_delta: f64,
    /// Eligible only when no regular storylet is selectable and idle threshold crossed.
    #[serde(default)]
    pub is_fallback: bool,
    /// Ids that must already have fired for this storylet to be eligible.
    #[serde(default)]
    pub requires_fired: Vec<String>,
    /// Ids that must never have fired for this storylet to be eligible.
    #[serde(default)]
    pub forbids_fired: Vec<String>,
}

fn default_weight() -> f64 {
    0.3
}

impl Storylet {
    /// Whether this storylet carries at least one natural-language precondition.
    pub fn has_nl_conditions(&self) -> bool {
        self.preconditions
            .iter()
            .any(|p| matches!(p, Precondition::Nl(_)))
    }
}
