use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::normalizer::normalize_mention;

pub const PERSON: &str = "PERSON";
pub const ORG: &str = "ORG";
pub const DATE: &str = "DATE";

/// Entity label -> distinct entity texts.
///
/// Ordered containers keep serialized output stable. Empty texts are never
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMap(BTreeMap<String, BTreeSet<String>>);

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mention after normalizing it. Returns false if nothing was
    /// stored (empty after normalization, or already present).
    pub fn insert(&mut self, label: &str, text: &str) -> bool {
        let Some(normalized) = normalize_mention(text) else {
            return false;
        };
        self.0.entry(label.to_string()).or_default().insert(normalized)
    }

    /// Register a label with no entities, so it still takes part in fusion.
    pub fn ensure_label(&mut self, label: &str) {
        self.0.entry(label.to_string()).or_default();
    }

    pub fn get(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.0.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(label, set)| (label.as_str(), set))
    }

    pub fn contains(&self, label: &str, text: &str) -> bool {
        self.0.get(label).is_some_and(|set| set.contains(text))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Total number of distinct (label, text) pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub(crate) fn insert_set(&mut self, label: &str, set: BTreeSet<String>) {
        self.0.insert(label.to_string(), set);
    }
}
