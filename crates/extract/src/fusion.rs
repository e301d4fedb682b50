use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::schema::EntityMap;

/// Per-label agreement between model and heuristic extraction.
///
/// Only labels present in the heuristic map are evaluated; the heuristic
/// rules are the reference frame. Each agreement set is the strict
/// intersection of the two inputs.
pub fn fuse(model: &EntityMap, heuristic: &EntityMap) -> EntityMap {
    let empty = BTreeSet::new();
    let mut agreement = EntityMap::new();

    for (label, heuristic_set) in heuristic.iter() {
        let model_set = model.get(label).unwrap_or(&empty);
        let shared: BTreeSet<String> = model_set.intersection(heuristic_set).cloned().collect();
        agreement.insert_set(label, shared);
    }

    agreement
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAgreement {
    pub model: usize,
    pub heuristic: usize,
    pub agreed: usize,
    /// `agreed / heuristic`, 0 when the heuristic found nothing.
    pub ratio: f64,
}

pub fn agreement_stats(
    model: &EntityMap,
    heuristic: &EntityMap,
    agreement: &EntityMap,
) -> BTreeMap<String, LabelAgreement> {
    heuristic
        .iter()
        .map(|(label, heuristic_set)| {
            let agreed = agreement.get(label).map_or(0, BTreeSet::len);
            let ratio = if heuristic_set.is_empty() {
                0.0
            } else {
                agreed as f64 / heuristic_set.len() as f64
            };
            let stats = LabelAgreement {
                model: model.get(label).map_or(0, BTreeSet::len),
                heuristic: heuristic_set.len(),
                agreed,
                ratio,
            };
            (label.to_string(), stats)
        })
        .collect()
}
