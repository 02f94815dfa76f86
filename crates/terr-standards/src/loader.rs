//! Builds [`ReferenceData`] from snapshot CSV contents.

use terr_model::{AliasEntry, CanonicalRegistry, Level, ReferenceData};

use crate::error::{Result, StandardsError};
use crate::rows::{AliasRow, MacroRow, ProvinceRow, RegionRow, parse_rows};

/// Raw contents of the four snapshot files.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSources<'a> {
    pub macro_regions: &'a str,
    pub regions: &'a str,
    pub provinces: &'a str,
    pub aliases: &'a str,
}

/// Parse and validate a snapshot.
///
/// Province sigle are registered as province-level aliases in addition to
/// the rows of the alias file.
pub fn build_reference(snapshot: &str, sources: &SnapshotSources<'_>) -> Result<ReferenceData> {
    let macros: Vec<MacroRow> = parse_rows(sources.macro_regions, "macro_regions.csv")?;
    let regions: Vec<RegionRow> = parse_rows(sources.regions, "regions.csv")?;
    let provinces: Vec<ProvinceRow> = parse_rows(sources.provinces, "provinces.csv")?;
    let alias_rows: Vec<AliasRow> = parse_rows(sources.aliases, "aliases.csv")?;

    let mut builder = CanonicalRegistry::builder(snapshot);
    for row in &macros {
        builder
            .add_macro(&row.name, row.code.as_deref())
            .map_err(|e| StandardsError::registry("macro_regions.csv", e))?;
    }
    for row in &regions {
        builder
            .add_region(&row.name, &row.macro_region, row.code.as_deref())
            .map_err(|e| StandardsError::registry("regions.csv", e))?;
    }
    for row in &provinces {
        builder
            .add_province(
                &row.name,
                &row.region,
                row.sigla.as_deref(),
                row.metropolitan,
            )
            .map_err(|e| StandardsError::registry("provinces.csv", e))?;
    }
    let registry = builder
        .build()
        .map_err(|e| StandardsError::registry(snapshot, e))?;

    let sigla_aliases: Vec<AliasEntry> = registry
        .provinces()
        .iter()
        .filter_map(|p| {
            p.sigla
                .as_ref()
                .map(|sigla| AliasEntry::new(sigla.clone(), p.name.as_str(), Level::Province))
        })
        .collect();
    let sigla_count = sigla_aliases.len();

    let entries = alias_rows
        .into_iter()
        .map(AliasEntry::from)
        .chain(sigla_aliases);
    let data = ReferenceData::new(registry, entries)
        .map_err(|e| StandardsError::registry("aliases.csv", e))?;

    tracing::info!(
        snapshot,
        macros = data.registry.count(Level::Macro),
        regions = data.registry.count(Level::Region),
        provinces = data.registry.count(Level::Province),
        aliases = data.aliases.len(),
        sigle = sigla_count,
        "reference snapshot loaded"
    );
    Ok(data)
}
