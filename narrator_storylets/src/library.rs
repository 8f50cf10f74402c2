//! The loaded, indexed collection of storylets a director selects against.

use std::collections::HashMap;

use crate::Storylet;

/// All storylets available to a director, indexed by id for O(1) lookup
/// (e.g. resolving `requires_fired`/`forbids_fired` during stage 3).
#[derive(Debug, Clone, Default)]
pub struct StoryletLibrary {
    storylets: Vec<Storylet>,
    id_index: HashMap<String, usize>,
}

impl StoryletLibrary {
    /// Build a library from an already-validated, deduplicated list of storylets.
    pub fn new(storylets: Vec<Storylet>) -> Self {
        let id_index = storylets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        StoryletLibrary {
            storylets,
            id_index,
        }
    }

    /// Look up a storylet by id.
    pub fn get(&self, id: &str) -> Option<&Storylet> {
        self.id_index.get(id).map(|&i| &self.storylets[i])
    }

    /// Whether `id` names a storylet in this library.
    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Iterate all storylets in stable, load-order.
    pub fn iter(&self) -> impl Iterator<Item = &Storylet> {
        self.storylets.iter()
    }

    /// Number of storylets in the library.
    pub fn len(&self) -> usize {
        self.storylets.len()
    }

    /// Whether the library has no storylets.
    pub fn is_empty(&self) -> bool {
        self.storylets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storylet(id: &str) -> Storylet {
        Storylet {
            id: id.to_string(),
            title: id.to_string(),
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
        }
    }

    #[test]
    fn looks_up_by_id() {
        let library = StoryletLibrary::new(vec![storylet("a"), storylet("b")]);
        assert!(library.get("a").is_some());
        assert!(library.get("missing").is_none());
        assert_eq!(library.len(), 2);
    }
}
