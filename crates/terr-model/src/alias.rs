//! Alias table: alternate spellings, abbreviations and historical labels.
//!
//! Aliases are stored by [`NormalizedKey`], so `"Reggio nell'Emilia"` and
//! `"REGGIO NELL EMILIA"` are the same alias. One key may legitimately point
//! at several canonicals (same level, or across levels) only when every such
//! row is flagged ambiguous; anything else is rejected at build time.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AliasConflict, ConflictReason, RegistryError, Result};
use crate::ids::CanonicalName;
use crate::level::Level;
use crate::normalize::{NormalizedKey, normalize};
use crate::registry::CanonicalRegistry;

/// One row of alias data.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub canonical: String,
    pub level: Level,
    #[serde(default)]
    pub ambiguous: bool,
}

impl AliasEntry {
    pub fn new(alias: impl Into<String>, canonical: impl Into<String>, level: Level) -> Self {
        Self {
            alias: alias.into(),
            canonical: canonical.into(),
            level,
            ambiguous: false,
        }
    }

    #[must_use]
    pub fn ambiguous(mut self) -> Self {
        self.ambiguous = true;
        self
    }
}

/// Where an alias points.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct AliasTarget {
    pub level: Level,
    pub canonical: CanonicalName,
}

/// Outcome of an alias lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasLookup {
    Found(AliasTarget),
    /// The alias is known but points at more than one canonical.
    Ambiguous(Vec<AliasTarget>),
    NotFound,
}

#[derive(Debug, Clone)]
struct AliasRow {
    target: AliasTarget,
    ambiguous: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    by_key: BTreeMap<String, Vec<AliasRow>>,
    by_canonical: BTreeMap<(Level, CanonicalName), BTreeSet<String>>,
}

impl AliasTable {
    /// Builds the table against `registry`, validating every entry.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownEntity`] when an alias names a canonical that
    ///   does not exist at the declared level.
    /// - [`RegistryError::InvalidAlias`] when an alias normalizes to nothing.
    /// - [`RegistryError::ConflictingAlias`] listing every alias that maps to
    ///   several canonicals at one level without the ambiguity flag, or that
    ///   normalizes to another canonical's own name.
    pub fn build(
        entries: impl IntoIterator<Item = AliasEntry>,
        registry: &CanonicalRegistry,
    ) -> Result<Self> {
        let mut table = Self::default();
        let mut seen: BTreeSet<(String, Level, CanonicalName)> = BTreeSet::new();

        for entry in entries {
            let Some(canonical) = registry.canonical(entry.level, entry.canonical.trim()) else {
                return Err(RegistryError::UnknownEntity {
                    level: entry.level,
                    name: entry.canonical,
                });
            };
            let canonical = canonical.clone();
            let key = normalize(&entry.alias);
            if key.is_empty() {
                return Err(RegistryError::InvalidAlias {
                    alias: entry.alias,
                    message: "normalizes to an empty key".to_string(),
                });
            }

            let target = AliasTarget {
                level: entry.level,
                canonical: canonical.clone(),
            };
            table
                .by_canonical
                .entry((entry.level, canonical.clone()))
                .or_default()
                .insert(entry.alias.trim().to_string());

            if seen.insert((key.as_str().to_string(), entry.level, canonical)) {
                table
                    .by_key
                    .entry(key.into_string())
                    .or_default()
                    .push(AliasRow {
                        target,
                        ambiguous: entry.ambiguous,
                    });
            } else if entry.ambiguous
                && let Some(row) = table.by_key.get_mut(key.as_str()).and_then(|rows| {
                    rows.iter_mut().find(|row| row.target == target)
                })
            {
                row.ambiguous = true;
            }
            table.entries.push(entry);
        }

        let conflicts = table.find_conflicts(registry);
        if !conflicts.is_empty() {
            return Err(RegistryError::ConflictingAlias { conflicts });
        }

        tracing::debug!(
            entries = table.entries.len(),
            keys = table.by_key.len(),
            ambiguous = table.ambiguous_keys().count(),
            "alias table built"
        );
        Ok(table)
    }

    fn find_conflicts(&self, registry: &CanonicalRegistry) -> Vec<AliasConflict> {
        let canonical_keys: BTreeMap<(Level, String), &CanonicalName> = Level::ALL
            .iter()
            .flat_map(|&level| {
                registry
                    .names_at(level)
                    .into_iter()
                    .map(move |name| ((level, normalize(name.as_str()).into_string()), name))
            })
            .collect();

        let mut conflicts = Vec::new();
        for (key, rows) in &self.by_key {
            for level in Level::ALL {
                let at_level: Vec<&AliasRow> =
                    rows.iter().filter(|row| row.target.level == level).collect();
                if at_level.is_empty() {
                    continue;
                }
                if at_level.len() > 1 && at_level.iter().any(|row| !row.ambiguous) {
                    conflicts.push(AliasConflict {
                        alias: key.clone(),
                        level,
                        canonicals: at_level
                            .iter()
                            .map(|row| row.target.canonical.to_string())
                            .collect(),
                        reason: ConflictReason::UnflaggedMultiTarget,
                    });
                }
                if let Some(owner) = canonical_keys.get(&(level, key.clone()))
                    && at_level.iter().any(|row| &row.target.canonical != *owner)
                {
                    let mut canonicals: Vec<String> = at_level
                        .iter()
                        .map(|row| row.target.canonical.to_string())
                        .collect();
                    canonicals.push(owner.to_string());
                    conflicts.push(AliasConflict {
                        alias: key.clone(),
                        level,
                        canonicals,
                        reason: ConflictReason::ShadowsCanonical,
                    });
                }
            }
        }
        conflicts
    }

    /// Raw alias texts registered for a canonical at a level.
    pub fn aliases_for(&self, canonical: &str, level: Level) -> BTreeSet<String> {
        let Ok(name) = CanonicalName::new(canonical) else {
            return BTreeSet::new();
        };
        self.by_canonical
            .get(&(level, name))
            .cloned()
            .unwrap_or_default()
    }

    /// Looks an alias up at one level.
    pub fn canonical_for(&self, alias: &str, level: Level) -> AliasLookup {
        self.lookup_key(&normalize(alias), Some(level))
    }

    /// Looks a pre-normalized key up at `hint`, or across all levels.
    ///
    /// Without a hint, a key present at several levels is ambiguous when any
    /// of its rows carries the ambiguity flag; otherwise the highest-precedence
    /// level wins.
    pub fn lookup_key(&self, key: &NormalizedKey, hint: Option<Level>) -> AliasLookup {
        let Some(rows) = self.by_key.get(key.as_str()) else {
            return AliasLookup::NotFound;
        };
        let candidates: Vec<&AliasRow> = match hint {
            Some(level) => rows.iter().filter(|row| row.target.level == level).collect(),
            None => rows.iter().collect(),
        };
        match candidates.as_slice() {
            [] => AliasLookup::NotFound,
            [only] => AliasLookup::Found(only.target.clone()),
            many => {
                let flagged = many.iter().any(|row| row.ambiguous);
                let top_level = many.iter().map(|row| row.target.level).min();
                let at_top: Vec<&&AliasRow> = many
                    .iter()
                    .filter(|row| Some(row.target.level) == top_level)
                    .collect();
                if !flagged && at_top.len() == 1 {
                    return AliasLookup::Found(at_top[0].target.clone());
                }
                let mut targets: Vec<AliasTarget> =
                    many.iter().map(|row| row.target.clone()).collect();
                targets.sort();
                AliasLookup::Ambiguous(targets)
            }
        }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized alias keys at `level` with the canonical each resolves to.
    ///
    /// Keys pointing at several canonicals are yielded once per target.
    pub fn keys_at(&self, level: Level) -> impl Iterator<Item = (&str, &CanonicalName)> {
        self.by_key.iter().flat_map(move |(key, rows)| {
            rows.iter()
                .filter(move |row| row.target.level == level)
                .map(move |row| (key.as_str(), &row.target.canonical))
        })
    }

    /// Keys that resolve to more than one target.
    pub fn ambiguous_keys(&self) -> impl Iterator<Item = &str> {
        self.by_key
            .iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(key, _)| key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CanonicalRegistry {
        let mut builder = CanonicalRegistry::builder("test");
        builder.add_macro("Nord-est", None).unwrap();
        builder.add_macro("Sud", None).unwrap();
        builder.add_region("Emilia-Romagna", "Nord-est", None).unwrap();
        builder.add_region("Calabria", "Sud", None).unwrap();
        builder
            .add_province("Reggio Emilia", "Emilia-Romagna", Some("RE"), false)
            .unwrap();
        builder
            .add_province("Reggio Calabria", "Calabria", Some("RC"), true)
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn finds_alias_by_normalized_key() {
        let table = AliasTable::build(
            [AliasEntry::new(
                "Reggio nell'Emilia",
                "Reggio Emilia",
                Level::Province,
            )],
            &registry(),
        )
        .unwrap();
        assert_eq!(
            table.canonical_for("REGGIO NELL EMILIA", Level::Province),
            AliasLookup::Found(AliasTarget {
                level: Level::Province,
                canonical: CanonicalName::new("Reggio Emilia").unwrap(),
            })
        );
        assert_eq!(
            table.canonical_for("reggio nell emilia", Level::Region),
            AliasLookup::NotFound
        );
        assert_eq!(
            table.aliases_for("Reggio Emilia", Level::Province).len(),
            1
        );
    }

    #[test]
    fn flagged_alias_is_ambiguous() {
        let table = AliasTable::build(
            [
                AliasEntry::new("Reggio", "Reggio Emilia", Level::Province).ambiguous(),
                AliasEntry::new("Reggio", "Reggio Calabria", Level::Province).ambiguous(),
            ],
            &registry(),
        )
        .unwrap();
        match table.canonical_for("reggio", Level::Province) {
            AliasLookup::Ambiguous(targets) => assert_eq!(targets.len(), 2),
            other => panic!("expected ambiguous lookup, got {other:?}"),
        }
    }

    #[test]
    fn unflagged_multi_target_is_rejected() {
        let result = AliasTable::build(
            [
                AliasEntry::new("Reggio", "Reggio Emilia", Level::Province),
                AliasEntry::new("Reggio", "Reggio Calabria", Level::Province).ambiguous(),
            ],
            &registry(),
        );
        match result {
            Err(RegistryError::ConflictingAlias { conflicts }) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].alias, "reggio");
                assert_eq!(conflicts[0].reason, ConflictReason::UnflaggedMultiTarget);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn alias_shadowing_other_canonical_is_rejected() {
        let result = AliasTable::build(
            [AliasEntry::new(
                "Reggio Calabria",
                "Reggio Emilia",
                Level::Province,
            )],
            &registry(),
        );
        assert!(matches!(
            result,
            Err(RegistryError::ConflictingAlias { .. })
        ));
    }

    #[test]
    fn alias_for_unknown_canonical_is_rejected() {
        let result = AliasTable::build(
            [AliasEntry::new("Atlantis", "Atlantide", Level::Region)],
            &registry(),
        );
        assert!(matches!(result, Err(RegistryError::UnknownEntity { .. })));
    }

    #[test]
    fn cross_level_alias_follows_precedence_unless_flagged() {
        let registry = registry();
        let table = AliasTable::build(
            [
                AliasEntry::new("Emilia", "Reggio Emilia", Level::Province),
                AliasEntry::new("Emilia", "Emilia-Romagna", Level::Region),
            ],
            &registry,
        )
        .unwrap();
        assert!(matches!(
            table.lookup_key(&normalize("emilia"), None),
            AliasLookup::Found(AliasTarget {
                level: Level::Province,
                ..
            })
        ));

        let flagged = AliasTable::build(
            [
                AliasEntry::new("Emilia", "Reggio Emilia", Level::Province).ambiguous(),
                AliasEntry::new("Emilia", "Emilia-Romagna", Level::Region).ambiguous(),
            ],
            &registry,
        )
        .unwrap();
        assert!(matches!(
            flagged.lookup_key(&normalize("emilia"), None),
            AliasLookup::Ambiguous(_)
        ));
        assert!(matches!(
            flagged.lookup_key(&normalize("emilia"), Some(Level::Region)),
            AliasLookup::Found(_)
        ));
    }
}
