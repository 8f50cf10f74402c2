//! Canonical JSON serialization for reproducible hashing (§6).
//!
//! A `TickRecord`, or any state summary fed to the judge cache, must hash
//! identically across replays of the same inputs. `serde_json`'s default map
//! ordering is insertion order for `serde_json::Value` (which itself preserves
//! object key order only with the `preserve_order` feature) — rather than
//! depend on that, this module sorts keys explicitly and renders numbers
//! without trailing zeros, matching `narrator_core::format_number`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialize `value` to canonical JSON bytes: object keys sorted, no
/// insignificant whitespace, numbers rendered without a trailing `.0`.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let raw = serde_json::to_value(value)?;
    let canonical = canonicalize(raw);
    Ok(render(&canonical).into_bytes())
}

/// Hash `value`'s canonical JSON form with SHA-256, returned as lowercase hex.
pub fn content_hash<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let bytes = to_canonical_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => serde_json::to_string(s).expect("string serialization never fails"),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", inner.join(","))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).expect("string serialization never fails"),
                        render(v)
                    )
                })
                .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}

fn render_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(f) = n.as_f64() {
        return narrator_core::format_number(f);
    }
    n.to_string()
}
