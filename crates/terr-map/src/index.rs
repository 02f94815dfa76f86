//! Per-level lookup tables precomputed from reference data.

use std::collections::{BTreeMap, BTreeSet};

use terr_model::{CanonicalName, Level, ReferenceData, normalize};

#[derive(Debug, Clone)]
pub(crate) struct FuzzyKey {
    pub key: String,
    pub char_len: usize,
    pub canonical: CanonicalName,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LevelIndex {
    /// Normalized canonical name -> canonical.
    pub normalized: BTreeMap<String, CanonicalName>,
    /// Canonical and alias keys scored by the fuzzy stage.
    pub fuzzy_keys: Vec<FuzzyKey>,
}

impl LevelIndex {
    pub(crate) fn build(reference: &ReferenceData, level: Level) -> Self {
        let mut index = Self::default();
        let mut seen: BTreeSet<(String, CanonicalName)> = BTreeSet::new();

        for name in reference.registry.names_at(level) {
            let key = normalize(name.as_str()).into_string();
            index.normalized.insert(key.clone(), name.clone());
            seen.insert((key, name.clone()));
        }
        for (key, canonical) in reference.aliases.keys_at(level) {
            seen.insert((key.to_string(), canonical.clone()));
        }

        index.fuzzy_keys = seen
            .into_iter()
            .map(|(key, canonical)| FuzzyKey {
                char_len: key.chars().count(),
                key,
                canonical,
            })
            .collect();
        index
    }
}
