//! The world snapshot: `StateStore` and its `get`/`clone` operations (§3, §4.1).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{MutationError, PathNotFound};
use crate::ids::{CharacterId, RelPair};
use crate::path::{CharField, Path, RelField};
use crate::value::Scalar;

/// An insertion-ordered string-keyed map, used for `vars` (§3 calls these
/// "ordered mapping from string key to scalar").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V: Clone> OrderedMap<V> {
    /// An empty map.
    pub fn new() -> Self {
        OrderedMap(Vec::new())
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or overwrite a value, preserving original insertion position on overwrite.
    pub fn set(&mut self, key: &str, value: V) {
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.0.push((key.to_string(), value));
        }
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The world snapshot: free-form vars, categorized facts, a tag set, and intensity (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    /// `world.vars.<key>`
    pub vars: OrderedMap<Scalar>,
    /// `world.facts.<category>.<key>`, both levels ordered by key for determinism.
    pub facts: BTreeMap<String, BTreeMap<String, String>>,
    /// `world.tags`, a set of strings.
    pub tags: Vec<String>,
    /// `world.intensity`, a real in `[0, 1]`, default `0.5`.
    pub intensity: f64,
}

impl WorldSnapshot {
    /// A freshly authored world: no vars, no facts, no tags, neutral intensity.
    pub fn new() -> Self {
        WorldSnapshot {
            vars: OrderedMap::new(),
            facts: BTreeMap::new(),
            tags: Vec::new(),
            intensity: 0.5,
        }
    }
}

/// A character's mood, status, trait/goal/fear sets, and free-form vars (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CharacterState {
    /// Open-ended, enumerable per project.
    pub mood: String,
    /// Open-ended status string.
    pub status: String,
    /// Stable personality traits.
    pub traits: Vec<String>,
    /// Active goals.
    pub goals: Vec<String>,
    /// Active fears.
    pub fears: Vec<String>,
    /// `characters.<id>.vars.<key>`
    pub vars: OrderedMap<Scalar>,
}

/// A relationship's numeric metrics (`trust`, `affection`, others), status, and vars (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelationshipState {
    /// Numeric metrics keyed by name, e.g. `trust`, `affection`.
    pub metrics: OrderedMap<f64>,
    /// Open-ended status string.
    pub status: String,
    /// `relationships.<a>|<b>.vars.<key>`
    pub vars: OrderedMap<Scalar>,
}

/// The full addressable world: world snapshot plus characters and relationships,
/// cloned per tick for diffing (§4.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StateStore {
    /// World-scoped state.
    pub world: WorldSnapshot,
    /// Character states, keyed by stable character id.
    pub characters: BTreeMap<CharacterId, CharacterState>,
    /// Relationship states, keyed by canonical pair.
    pub relationships: BTreeMap<RelPair, RelationshipState>,
}

impl StateStore {
    /// An empty state: no characters, no relationships, a fresh world.
    pub fn new() -> Self {
        StateStore {
            world: WorldSnapshot::new(),
            characters: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    /// Resolve a path to its current scalar value. Fails with `PathNotFound` when
    /// any segment is absent; paths are pure data, there is no code evaluation (§4.1).
    pub fn get(&self, path: &Path) -> Result<Scalar, PathNotFound> {
        match path {
            Path::WorldVar(key) => self
                .world
                .vars
                .get(key)
                .cloned()
                .ok_or_else(|| PathNotFound::new(path.clone())),
            Path::WorldTag => Ok(Scalar::string_list(self.world.tags.iter().cloned())),
            Path::WorldFact(category, key) => self
                .world
                .facts
                .get(category)
                .and_then(|m| m.get(key))
                .map(|v| Scalar::Text(v.clone()))
                .ok_or_else(|| PathNotFound::new(path.clone())),
            Path::WorldIntensity => Ok(Scalar::Number(self.world.intensity)),
            Path::Character(id, field) => {
                let character = self
                    .characters
                    .get(id)
                    .ok_or_else(|| PathNotFound::new(path.clone()))?;
                self.get_char_field(character, field, path)
            }
            Path::Relationship(pair, field) => {
                let relationship = self
                    .relationships
                    .get(pair)
                    .ok_or_else(|| PathNotFound::new(path.clone()))?;
                self.get_rel_field(relationship, field, path)
            }
        }
    }

    fn get_char_field(
        &self,
        character: &CharacterState,
        field: &CharField,
        path: &Path,
    ) -> Result<Scalar, PathNotFound> {
        match field {
            CharField::Mood => Ok(Scalar::Text(character.mood.clone())),
            CharField::Status => Ok(Scalar::Text(character.status.clone())),
            CharField::Traits => Ok(Scalar::string_list(character.traits.iter().cloned())),
            CharField::Goals => Ok(Scalar::string_list(character.goals.iter().cloned())),
            CharField::Fears => Ok(Scalar::string_list(character.fears.iter().cloned())),
            CharField::Var(key) => character
                .vars
                .get(key)
                .cloned()
                .ok_or_else(|| PathNotFound::new(path.clone())),
        }
    }

    fn get_rel_field(
        &self,
        relationship: &RelationshipState,
        field: &RelField,
        path: &Path,
    ) -> Result<Scalar, PathNotFound> {
        match field {
            RelField::Metric(name) => relationship
                .metrics
                .get(name)
                .map(|v| Scalar::Number(*v))
                .ok_or_else(|| PathNotFound::new(path.clone())),
            RelField::Status => Ok(Scalar::Text(relationship.status.clone())),
            RelField::Var(key) => relationship
                .vars
                .get(key)
                .cloned()
                .ok_or_else(|| PathNotFound::new(path.clone())),
        }
    }

    /// A value-equal deep copy, used to snapshot state before mutating for a tick (§4.1).
    pub fn deep_clone(&self) -> StateStore {
        self.clone()
    }

    /// Overwrite the value at `path`. Vivifies `vars`/`facts` entries that don't
    /// yet exist; fails if the containing character/relationship/category doesn't
    /// exist, or if `value`'s shape doesn't match the field (e.g. `mood` needs text).
    pub fn set(&mut self, path: &Path, value: Scalar) -> Result<(), MutationError> {
        match path {
            Path::WorldVar(key) => {
                self.world.vars.set(key, value);
                Ok(())
            }
            Path::WorldTag => {
                self.world.tags = expect_string_list(path, &value)?;
                Ok(())
            }
            Path::WorldFact(category, key) => {
                let text = expect_text(path, &value)?;
                self.world.facts.entry(category.clone()).or_default().insert(key.clone(), text);
                Ok(())
            }
            Path::WorldIntensity => {
                self.world.intensity = expect_number(path, &value)?.clamp(0.0, 1.0);
                Ok(())
            }
            Path::Character(id, field) => {
                let character = self
                    .characters
                    .get_mut(id)
                    .ok_or_else(|| PathNotFound::new(path.clone()))?;
                set_char_field(character, field, value, path)
            }
            Path::Relationship(pair, field) => {
                let relationship = self.relationships.entry(pair.clone()).or_default();
                set_rel_field(relationship, field, value, path)
            }
        }
    }

    /// Add `delta` to the number at `path`. Fails if the path is absent or not a number.
    pub fn add(&mut self, path: &Path, delta: f64) -> Result<(), MutationError> {
        let current = self.get(path).map_err(MutationError::NotFound)?;
        let n = expect_number(path, &current)?;
        self.set(path, Scalar::Number(n + delta))
    }

    /// Multiply the number at `path` by `factor`. Fails if the path is absent or not a number.
    pub fn multiply(&mut self, path: &Path, factor: f64) -> Result<(), MutationError> {
        let current = self.get(path).map_err(MutationError::NotFound)?;
        let n = expect_number(path, &current)?;
        self.set(path, Scalar::Number(n * factor))
    }

    /// Push `value` onto the list at `path` with no dedup, creating an empty list
    /// first if the path doesn't exist yet (resolves the §9 Open Question).
    pub fn append(&mut self, path: &Path, value: Scalar) -> Result<(), MutationError> {
        let mut list = match self.get(path) {
            Ok(existing) => expect_list(path, &existing)?,
            Err(_) => Vec::new(),
        };
        list.push(value);
        self.set(path, Scalar::List(list))
    }

    /// Remove the first list entry equal to `value`; a no-op if it isn't present.
    /// Fails if `path` itself doesn't resolve to an existing list.
    pub fn remove(&mut self, path: &Path, value: &Scalar) -> Result<(), MutationError> {
        let current = self.get(path).map_err(MutationError::NotFound)?;
        let mut list = expect_list(path, &current)?;
        if let Some(idx) = list.iter().position(|v| v == value) {
            list.remove(idx);
        }
        self.set(path, Scalar::List(list))
    }
}

fn expect_number(path: &Path, value: &Scalar) -> Result<f64, MutationError> {
    value.as_number().ok_or_else(|| MutationError::TypeMismatch {
        path: path.clone(),
        expected: "number",
        found: value.kind_name(),
    })
}

fn expect_text(path: &Path, value: &Scalar) -> Result<String, MutationError> {
    match value {
        Scalar::Text(s) => Ok(s.clone()),
        other => Err(MutationError::TypeMismatch {
            path: path.clone(),
            expected: "text",
            found: other.kind_name(),
        }),
    }
}

fn expect_list(path: &Path, value: &Scalar) -> Result<Vec<Scalar>, MutationError> {
    value
        .as_list()
        .map(|l| l.to_vec())
        .ok_or_else(|| MutationError::TypeMismatch {
            path: path.clone(),
            expected: "list",
            found: value.kind_name(),
        })
}

fn expect_string_list(path: &Path, value: &Scalar) -> Result<Vec<String>, MutationError> {
    let list = expect_list(path, value)?;
    list.into_iter()
        .map(|item| match item {
            Scalar::Text(s) => Ok(s),
            other => Err(MutationError::TypeMismatch {
                path: path.clone(),
                expected: "text",
                found: other.kind_name(),
            }),
        })
        .collect()
}

fn set_char_field(
    character: &mut CharacterState,
    field: &CharField,
    value: Scalar,
    path: &Path,
) -> Result<(), MutationError> {
    match field {
        CharField::Mood => character.mood = expect_text(path, &value)?,
        CharField::Status => character.status = expect_text(path, &value)?,
        CharField::Traits => character.traits = expect_string_list(path, &value)?,
        CharField::Goals => character.goals = expect_string_list(path, &value)?,
        CharField::Fears => character.fears = expect_string_list(path, &value)?,
        CharField::Var(key) => character.vars.set(key, value),
    }
    Ok(())
}

fn set_rel_field(
    relationship: &mut RelationshipState,
    field: &RelField,
    value: Scalar,
    path: &Path,
) -> Result<(), MutationError> {
    match field {
        RelField::Metric(name) => relationship.metrics.set(name, expect_number(path, &value)?),
        RelField::Status => relationship.status = expect_text(path, &value)?,
        RelField::Var(key) => relationship.vars.set(key, value),
    }
    Ok(())
}
