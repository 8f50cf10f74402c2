//! Stable identifiers used throughout the state model.
//!
//! Small newtype wrappers over raw `String` rather than passing ids around
//! positionally.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A stable character identifier, assigned by the authoring tool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl CharacterId {
    /// Wrap a string as a `CharacterId`.
    pub fn new(id: impl Into<String>) -> Self {
        CharacterId(id.into())
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unordered relationship pair, stored under its canonical (lexicographically
/// sorted) ordering so `a|b` and `b|a` address the same relationship (§4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelPair(pub CharacterId, pub CharacterId);

impl RelPair {
    /// Build the canonical pair for two character ids, regardless of input order.
    pub fn canonical(a: CharacterId, b: CharacterId) -> Self {
        if a.0 <= b.0 {
            RelPair(a, b)
        } else {
            RelPair(b, a)
        }
    }
}

impl fmt::Display for RelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.0, self.1)
    }
}

impl PartialOrd for RelPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelPair {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.0, &self.1).cmp(&(&other.0, &other.1))
    }
}
