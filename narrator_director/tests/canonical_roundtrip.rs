//! Canonical-JSON idempotence: canonicalizing an already-canonical document
//! must be a no-op, and canonicalizing the same logical document from
//! differently-ordered/differently-formatted source JSON must converge on
//! byte-identical output (round-trip law (a), spec.md §8).

use narrator_director::canonical::to_canonical_bytes;
use serde_json::Value;

fn canonicalize_str(raw: &str) -> String {
    let value: Value = serde_json::from_str(raw).unwrap();
    String::from_utf8(to_canonical_bytes(&value).unwrap()).unwrap()
}

/// A tick-record-shaped fixture, deliberately authored with out-of-order
/// keys and nested objects/arrays, as it might arrive from a hand-edited
/// save file.
const SCRAMBLED_TICK_RECORD: &str = r#"
{
  "rationale": {
    "candidates_considered": ["intro.meet_mara", "ambient.weather"],
    "rejection_reasons": {"ambient.weather": "regular candidates available"}
  },
  "tick_index": 3,
  "selected": [{"storylet_id": "intro.meet_mara", "is_fallback": false}],
  "effect_diffs": [
    {"after": true, "before": null, "path": "world.vars.met_mara", "reason": null}
  ],
  "intensity_after": 0.6,
  "intensity_before": 0.5,
  "rng_seed_used": 42
}
"#;

#[test]
fn canonicalizing_an_already_canonical_document_is_a_no_op() {
    let once = canonicalize_str(SCRAMBLED_TICK_RECORD);
    let twice = canonicalize_str(&once);
    assert_eq!(once, twice, "re-canonicalizing canonical output must not change it");
}

#[test]
fn differently_ordered_source_json_converges_on_the_same_bytes() {
    let reordered = r#"
    {
      "rng_seed_used": 42,
      "intensity_before": 0.5,
      "intensity_after": 0.6,
      "selected": [{"is_fallback": false, "storylet_id": "intro.meet_mara"}],
      "tick_index": 3,
      "effect_diffs": [
        {"reason": null, "path": "world.vars.met_mara", "before": null, "after": true}
      ],
      "rationale": {
        "rejection_reasons": {"ambient.weather": "regular candidates available"},
        "candidates_considered": ["intro.meet_mara", "ambient.weather"]
      }
    }
    "#;

    assert_eq!(
        canonicalize_str(SCRAMBLED_TICK_RECORD),
        canonicalize_str(reordered)
    );
}

#[test]
fn whole_number_floats_canonicalize_identically_to_integers() {
    let as_float = canonicalize_str(r#"{"intensity_after": 1.0}"#);
    let as_int = canonicalize_str(r#"{"intensity_after": 1}"#);
    assert_eq!(as_float, as_int);
}
