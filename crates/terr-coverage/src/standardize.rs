//! Attach canonical territories to tidy rows.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use terr_map::Resolver;
use terr_model::{Level, MatchMethod, ResolutionResult};

use crate::error::{Result, TidyError};
use crate::tidy::TidyRecord;

/// A tidy row plus the outcome of resolving its territory label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedRecord {
    pub year: i32,
    pub territory: String,
    pub variable: String,
    pub sex: Option<String>,
    pub age: Option<String>,
    pub value: Option<f64>,
    pub province_std: Option<String>,
    pub region_std: Option<String>,
    pub macro_std: Option<String>,
    pub level: Option<Level>,
    pub match_method: MatchMethod,
    pub confidence: f64,
}

impl StandardizedRecord {
    fn from_parts(record: &TidyRecord, result: &ResolutionResult) -> Self {
        let name = |value: &Option<terr_model::CanonicalName>| value.as_ref().map(ToString::to_string);
        Self {
            year: record.year,
            territory: record.territory.clone(),
            variable: record.variable.clone(),
            sex: record.sex.clone(),
            age: record.age.clone(),
            value: record.value,
            province_std: name(&result.province),
            region_std: name(&result.region),
            macro_std: name(&result.macro_region),
            level: result.matched_level,
            match_method: result.method,
            confidence: result.confidence,
        }
    }

    /// Standardized territory name at `level`, if this row has one.
    pub fn territory_at(&self, level: Level) -> Option<&str> {
        match level {
            Level::Province => self.province_std.as_deref(),
            Level::Region => self.region_std.as_deref(),
            Level::Macro => self.macro_std.as_deref(),
        }
    }
}

/// Standardized rows plus one resolution per distinct label.
#[derive(Debug, Clone)]
pub struct Standardized {
    pub records: Vec<StandardizedRecord>,
    /// Distinct labels in first-seen order.
    pub resolutions: Vec<ResolutionResult>,
}

/// Resolve every row's territory. Each distinct label is resolved once;
/// rows keep their input order.
pub fn standardize(records: &[TidyRecord], resolver: &Resolver, hint: Option<Level>) -> Standardized {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut resolutions: Vec<ResolutionResult> = Vec::new();
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let slot = *slots.entry(record.territory.as_str()).or_insert_with(|| {
            resolutions.push(resolver.resolve(&record.territory, hint));
            resolutions.len() - 1
        });
        out.push(StandardizedRecord::from_parts(record, &resolutions[slot]));
    }

    let unresolved = resolutions.iter().filter(|r| r.needs_review()).count();
    tracing::info!(
        rows = out.len(),
        labels = resolutions.len(),
        needs_review = unresolved,
        "standardized territories"
    );
    Standardized {
        records: out,
        resolutions,
    }
}

pub fn read_standardized(path: &Path) -> Result<Vec<StandardizedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| TidyError::csv(path, e))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<StandardizedRecord>, _>>()
        .map_err(|e| TidyError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use terr_model::{AliasEntry, CanonicalRegistry, ReferenceData};

    use super::*;
    use crate::tidy::write_csv;

    fn resolver() -> Resolver {
        let mut builder = CanonicalRegistry::builder("test");
        builder.add_macro("Isole", None).unwrap();
        builder.add_region("Sardegna", "Isole", None).unwrap();
        builder.add_province("Nuoro", "Sardegna", Some("NU"), false).unwrap();
        builder.add_province("Sassari", "Sardegna", Some("SS"), false).unwrap();
        let registry = builder.build().unwrap();
        let aliases = vec![AliasEntry::new("Ogliastra", "Nuoro", Level::Province)];
        Resolver::with_defaults(Arc::new(ReferenceData::new(registry, aliases).unwrap()))
    }

    #[test]
    fn rows_keep_order_and_labels_resolve_once() {
        let records = vec![
            TidyRecord::new(2020, "Nuoro", "pop").with_value(1.0),
            TidyRecord::new(2020, "Ogliastra", "pop"),
            TidyRecord::new(2021, "Nuoro", "pop").with_value(2.0),
            TidyRecord::new(2021, "Atlantide", "pop"),
        ];
        let standardized = standardize(&records, &resolver(), None);

        assert_eq!(standardized.records.len(), 4);
        assert_eq!(standardized.resolutions.len(), 3);
        let first = &standardized.records[0];
        assert_eq!(first.province_std.as_deref(), Some("Nuoro"));
        assert_eq!(first.region_std.as_deref(), Some("Sardegna"));
        assert_eq!(first.macro_std.as_deref(), Some("Isole"));
        assert_eq!(first.level, Some(Level::Province));
        assert_eq!(first.match_method, MatchMethod::Exact);

        assert_eq!(standardized.records[1].match_method, MatchMethod::Alias);
        assert_eq!(standardized.records[1].territory, "Ogliastra");
        assert_eq!(standardized.records[2].year, 2021);
        assert_eq!(standardized.records[3].match_method, MatchMethod::Unresolved);
        assert!(standardized.records[3].level.is_none());
        assert_eq!(standardized.records[3].territory_at(Level::Region), None);
    }

    #[test]
    fn standardized_csv_reads_back() {
        let records = vec![
            TidyRecord::new(2020, "Sardegna", "pop").with_value(3.5),
            TidyRecord::new(2020, "Atlantide", "pop"),
        ];
        let standardized = standardize(&records, &resolver(), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("std.csv");
        write_csv(&path, &standardized.records).unwrap();
        assert_eq!(read_standardized(&path).unwrap(), standardized.records);
    }
}
