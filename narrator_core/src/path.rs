//! Dotted-path addressing into world/character/relationship state.
//!
//! Per the design guidance in §9, paths are a tagged-variant representation rather
//! than closures or reflection, so every operation is an exhaustive match and a
//! typo in a path string fails at parse time, not deep inside a condition check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::MalformedPathError;
use crate::ids::{CharacterId, RelPair};

/// A parsed, addressable location in a `StateStore`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Path {
    /// `world.vars.<key>`
    WorldVar(String),
    /// `world.tags`
    WorldTag,
    /// `world.facts.<category>.<key>`
    WorldFact(String, String),
    /// `world.intensity`
    WorldIntensity,
    /// `characters.<id>.<field>`
    Character(CharacterId, CharField),
    /// `relationships.<a>|<b>.<field>`
    Relationship(RelPair, RelField),
}

/// The addressable fields of a character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharField {
    /// `mood`
    Mood,
    /// `status`
    Status,
    /// `traits`
    Traits,
    /// `goals`
    Goals,
    /// `fears`
    Fears,
    /// `vars.<key>`
    Var(String),
}

/// The addressable fields of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelField {
    /// A numeric metric, e.g. `trust`, `affection`, or an author-defined metric.
    Metric(String),
    /// `status`
    Status,
    /// `vars.<key>`
    Var(String),
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::WorldVar(key) => write!(f, "world.vars.{key}"),
            Path::WorldTag => write!(f, "world.tags"),
            Path::WorldFact(cat, key) => write!(f, "world.facts.{cat}.{key}"),
            Path::WorldIntensity => write!(f, "world.intensity"),
            Path::Character(id, field) => write!(f, "characters.{id}.{field}"),
            Path::Relationship(pair, field) => write!(f, "relationships.{pair}.{field}"),
        }
    }
}

impl fmt::Display for CharField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharField::Mood => write!(f, "mood"),
            CharField::Status => write!(f, "status"),
            CharField::Traits => write!(f, "traits"),
            CharField::Goals => write!(f, "goals"),
            CharField::Fears => write!(f, "fears"),
            CharField::Var(key) => write!(f, "vars.{key}"),
        }
    }
}

impl fmt::Display for RelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelField::Metric(name) => write!(f, "{name}"),
            RelField::Status => write!(f, "status"),
            RelField::Var(key) => write!(f, "vars.{key}"),
        }
    }
}

/// Parses dotted-path text into a `Path`. Never touches a `StateStore` — parsing
/// is pure syntax, so a malformed path string is a `ValidationError` (§7), not a
/// runtime `PathNotFound`.
pub struct PathResolver;

impl PathResolver {
    /// Parse `s` into a `Path`, or a `MalformedPathError` describing the problem.
    pub fn parse(s: &str) -> Result<Path, MalformedPathError> {
        let mut top = s.splitn(2, '.');
        let root = top.next().unwrap_or("");
        let rest = top
            .next()
            .ok_or_else(|| MalformedPathError(s.to_string()))?;

        match root {
            "world" => Self::parse_world(s, rest),
            "characters" => Self::parse_character(s, rest),
            "relationships" => Self::parse_relationship(s, rest),
            _ => Err(MalformedPathError(s.to_string())),
        }
    }

    fn parse_world(full: &str, rest: &str) -> Result<Path, MalformedPathError> {
        if rest == "tags" {
            return Ok(Path::WorldTag);
        }
        if rest == "intensity" {
            return Ok(Path::WorldIntensity);
        }
        if let Some(key) = rest.strip_prefix("vars.") {
            if key.is_empty() {
                return Err(MalformedPathError(full.to_string()));
            }
            return Ok(Path::WorldVar(key.to_string()));
        }
        if let Some(tail) = rest.strip_prefix("facts.") {
            let mut parts = tail.splitn(2, '.');
            let category = parts.next().filter(|s| !s.is_empty());
            let key = parts.next().filter(|s| !s.is_empty());
            return match (category, key) {
                (Some(category), Some(key)) => {
                    Ok(Path::WorldFact(category.to_string(), key.to_string()))
                }
                _ => Err(MalformedPathError(full.to_string())),
            };
        }
        Err(MalformedPathError(full.to_string()))
    }

    fn parse_character(full: &str, rest: &str) -> Result<Path, MalformedPathError> {
        let mut parts = rest.splitn(2, '.');
        let id = parts.next().filter(|s| !s.is_empty());
        let field = parts.next().filter(|s| !s.is_empty());
        let (id, field) = match (id, field) {
            (Some(id), Some(field)) => (id, field),
            _ => return Err(MalformedPathError(full.to_string())),
        };
        let field = Self::parse_char_field(field).ok_or_else(|| MalformedPathError(full.to_string()))?;
        Ok(Path::Character(CharacterId::new(id), field))
    }

    fn parse_char_field(field: &str) -> Option<CharField> {
        match field {
            "mood" => Some(CharField::Mood),
            "status" => Some(CharField::Status),
            "traits" => Some(CharField::Traits),
            "goals" => Some(CharField::Goals),
            "fears" => Some(CharField::Fears),
            other => other
                .strip_prefix("vars.")
                .filter(|k| !k.is_empty())
                .map(|k| CharField::Var(k.to_string())),
        }
    }

    fn parse_relationship(full: &str, rest: &str) -> Result<Path, MalformedPathError> {
        let mut parts = rest.splitn(2, '.');
        let pair = parts.next().filter(|s| !s.is_empty());
        let field = parts.next().filter(|s| !s.is_empty());
        let (pair, field) = match (pair, field) {
            (Some(pair), Some(field)) => (pair, field),
            _ => return Err(MalformedPathError(full.to_string())),
        };
        let mut ids = pair.splitn(2, '|');
        let a = ids.next().filter(|s| !s.is_empty());
        let b = ids.next().filter(|s| !s.is_empty());
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(MalformedPathError(full.to_string())),
        };
        let field = Self::parse_rel_field(field);
        Ok(Path::Relationship(
            RelPair::canonical(CharacterId::new(a), CharacterId::new(b)),
            field,
        ))
    }

    fn parse_rel_field(field: &str) -> RelField {
        match field {
            "status" => RelField::Status,
            other => match other.strip_prefix("vars.") {
                Some(key) if !key.is_empty() => RelField::Var(key.to_string()),
                _ => RelField::Metric(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_world_var() {
        assert_eq!(
            PathResolver::parse("world.vars.tension").unwrap(),
            Path::WorldVar("tension".to_string())
        );
    }

    #[test]
    fn parses_world_tags_and_intensity() {
        assert_eq!(PathResolver::parse("world.tags").unwrap(), Path::WorldTag);
        assert_eq!(
            PathResolver::parse("world.intensity").unwrap(),
            Path::WorldIntensity
        );
    }

    #[test]
    fn parses_world_fact() {
        assert_eq!(
            PathResolver::parse("world.facts.history.founder").unwrap(),
            Path::WorldFact("history".to_string(), "founder".to_string())
        );
    }

    #[test]
    fn parses_character_fields() {
        assert_eq!(
            PathResolver::parse("characters.mara.mood").unwrap(),
            Path::Character(CharacterId::new("mara"), CharField::Mood)
        );
        assert_eq!(
            PathResolver::parse("characters.mara.vars.grudge").unwrap(),
            Path::Character(CharacterId::new("mara"), CharField::Var("grudge".to_string()))
        );
    }

    #[test]
    fn parses_relationship_canonicalizes_pair() {
        let forward = PathResolver::parse("relationships.zed|ana.trust").unwrap();
        let canonical = Path::Relationship(
            RelPair::canonical(CharacterId::new("zed"), CharacterId::new("ana")),
            RelField::Metric("trust".to_string()),
        );
        assert_eq!(forward, canonical);
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(PathResolver::parse("world").is_err());
        assert!(PathResolver::parse("characters.mara").is_err());
        assert!(PathResolver::parse("bogus.thing").is_err());
        assert!(PathResolver::parse("relationships.onlyone.trust").is_err());
    }

    #[test]
    fn display_round_trips_canonical_form() {
        let p = PathResolver::parse("world.vars.tension").unwrap();
        assert_eq!(p.to_string(), "world.vars.tension");
    }
}
