//! Canonical registry: the fixed province → region → macro-region hierarchy.
//!
//! The registry is assembled once through [`RegistryBuilder`], validated, and
//! read-only afterwards. Share it behind an `Arc`.

use std::collections::BTreeMap;

use crate::error::{RegistryError, Result};
use crate::ids::CanonicalName;
use crate::level::Level;
use crate::normalize::normalize;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MacroRecord {
    pub name: CanonicalName,
    /// NUTS-1 code (e.g. `ITC`).
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RegionRecord {
    pub name: CanonicalName,
    /// ISTAT region code (`01`..`20`).
    pub code: Option<String>,
    pub macro_region: CanonicalName,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProvinceRecord {
    pub name: CanonicalName,
    /// Two-letter vehicle-registration abbreviation (e.g. `RM`).
    pub sigla: Option<String>,
    pub region: CanonicalName,
    pub metropolitan: bool,
}

#[derive(Debug, Clone)]
pub struct CanonicalRegistry {
    snapshot: String,
    macros: Vec<MacroRecord>,
    regions: Vec<RegionRecord>,
    provinces: Vec<ProvinceRecord>,
    macro_index: BTreeMap<String, usize>,
    region_index: BTreeMap<String, usize>,
    province_index: BTreeMap<String, usize>,
}

impl CanonicalRegistry {
    pub fn builder(snapshot: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder::new(snapshot)
    }

    /// Label of the reference snapshot this registry was built from.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn list_provinces(&self) -> impl Iterator<Item = &CanonicalName> {
        self.provinces.iter().map(|p| &p.name)
    }

    pub fn list_regions(&self) -> impl Iterator<Item = &CanonicalName> {
        self.regions.iter().map(|r| &r.name)
    }

    pub fn list_macros(&self) -> impl Iterator<Item = &CanonicalName> {
        self.macros.iter().map(|m| &m.name)
    }

    /// Canonical names at a level, in snapshot order.
    pub fn names_at(&self, level: Level) -> Vec<&CanonicalName> {
        match level {
            Level::Province => self.list_provinces().collect(),
            Level::Region => self.list_regions().collect(),
            Level::Macro => self.list_macros().collect(),
        }
    }

    pub fn count(&self, level: Level) -> usize {
        match level {
            Level::Province => self.provinces.len(),
            Level::Region => self.regions.len(),
            Level::Macro => self.macros.len(),
        }
    }

    /// Exact (case-sensitive) canonical lookup.
    pub fn canonical(&self, level: Level, name: &str) -> Option<&CanonicalName> {
        match level {
            Level::Province => self.province(name).map(|p| &p.name),
            Level::Region => self.region(name).map(|r| &r.name),
            Level::Macro => self
                .macro_index
                .get(name)
                .map(|&idx| &self.macros[idx].name),
        }
    }

    pub fn contains(&self, level: Level, name: &str) -> bool {
        self.canonical(level, name).is_some()
    }

    pub fn province(&self, name: &str) -> Option<&ProvinceRecord> {
        self.province_index
            .get(name)
            .map(|&idx| &self.provinces[idx])
    }

    pub fn region(&self, name: &str) -> Option<&RegionRecord> {
        self.region_index.get(name).map(|&idx| &self.regions[idx])
    }

    pub fn macro_region(&self, name: &str) -> Option<&MacroRecord> {
        self.macro_index.get(name).map(|&idx| &self.macros[idx])
    }

    pub fn provinces(&self) -> &[ProvinceRecord] {
        &self.provinces
    }

    pub fn regions(&self) -> &[RegionRecord] {
        &self.regions
    }

    pub fn macros(&self) -> &[MacroRecord] {
        &self.macros
    }

    pub fn region_of(&self, province: &str) -> Result<&CanonicalName> {
        self.province(province)
            .map(|p| &p.region)
            .ok_or_else(|| RegistryError::unknown(Level::Province, province))
    }

    pub fn macro_of(&self, region: &str) -> Result<&CanonicalName> {
        self.region(region)
            .map(|r| &r.macro_region)
            .ok_or_else(|| RegistryError::unknown(Level::Region, region))
    }

    pub fn provinces_in(&self, region: &str) -> Result<Vec<&CanonicalName>> {
        if self.region(region).is_none() {
            return Err(RegistryError::unknown(Level::Region, region));
        }
        Ok(self
            .provinces
            .iter()
            .filter(|p| p.region.as_str() == region)
            .map(|p| &p.name)
            .collect())
    }

    pub fn regions_in(&self, macro_region: &str) -> Result<Vec<&CanonicalName>> {
        if self.macro_region(macro_region).is_none() {
            return Err(RegistryError::unknown(Level::Macro, macro_region));
        }
        Ok(self
            .regions
            .iter()
            .filter(|r| r.macro_region.as_str() == macro_region)
            .map(|r| &r.name)
            .collect())
    }
}

/// Collects hierarchy records and validates them on [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    snapshot: String,
    macros: Vec<MacroRecord>,
    regions: Vec<RegionRecord>,
    provinces: Vec<ProvinceRecord>,
}

impl RegistryBuilder {
    pub fn new(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: snapshot.into(),
            ..Self::default()
        }
    }

    pub fn add_macro(&mut self, name: &str, code: Option<&str>) -> Result<&mut Self> {
        self.macros.push(MacroRecord {
            name: CanonicalName::new(name)?,
            code: non_blank(code),
        });
        Ok(self)
    }

    pub fn add_region(
        &mut self,
        name: &str,
        macro_region: &str,
        code: Option<&str>,
    ) -> Result<&mut Self> {
        self.regions.push(RegionRecord {
            name: CanonicalName::new(name)?,
            code: non_blank(code),
            macro_region: CanonicalName::new(macro_region)?,
        });
        Ok(self)
    }

    pub fn add_province(
        &mut self,
        name: &str,
        region: &str,
        sigla: Option<&str>,
        metropolitan: bool,
    ) -> Result<&mut Self> {
        self.provinces.push(ProvinceRecord {
            name: CanonicalName::new(name)?,
            sigla: non_blank(sigla).map(|s| s.to_ascii_uppercase()),
            region: CanonicalName::new(region)?,
            metropolitan,
        });
        Ok(self)
    }

    pub fn build(self) -> Result<CanonicalRegistry> {
        let macro_index = index_level(Level::Macro, self.macros.iter().map(|m| &m.name))?;
        let region_index = index_level(Level::Region, self.regions.iter().map(|r| &r.name))?;
        let province_index =
            index_level(Level::Province, self.provinces.iter().map(|p| &p.name))?;

        for region in &self.regions {
            if !macro_index.contains_key(region.macro_region.as_str()) {
                return Err(RegistryError::MalformedHierarchy {
                    message: format!(
                        "region '{}' references unknown macro-region '{}'",
                        region.name, region.macro_region
                    ),
                });
            }
        }
        for province in &self.provinces {
            if !region_index.contains_key(province.region.as_str()) {
                return Err(RegistryError::MalformedHierarchy {
                    message: format!(
                        "province '{}' references unknown region '{}'",
                        province.name, province.region
                    ),
                });
            }
        }
        for macro_record in &self.macros {
            if !self
                .regions
                .iter()
                .any(|r| r.macro_region == macro_record.name)
            {
                return Err(RegistryError::MalformedHierarchy {
                    message: format!("macro-region '{}' has no regions", macro_record.name),
                });
            }
        }

        let mut sigle: BTreeMap<&str, &CanonicalName> = BTreeMap::new();
        for province in &self.provinces {
            if let Some(sigla) = province.sigla.as_deref()
                && let Some(existing) = sigle.insert(sigla, &province.name)
            {
                return Err(RegistryError::MalformedHierarchy {
                    message: format!(
                        "sigla '{sigla}' assigned to both '{existing}' and '{}'",
                        province.name
                    ),
                });
            }
        }

        tracing::debug!(
            snapshot = %self.snapshot,
            macros = self.macros.len(),
            regions = self.regions.len(),
            provinces = self.provinces.len(),
            "canonical registry built"
        );

        Ok(CanonicalRegistry {
            snapshot: self.snapshot,
            macros: self.macros,
            regions: self.regions,
            provinces: self.provinces,
            macro_index,
            region_index,
            province_index,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Indexes names at one level, rejecting duplicates and normalized-key clashes.
fn index_level<'a>(
    level: Level,
    names: impl Iterator<Item = &'a CanonicalName>,
) -> Result<BTreeMap<String, usize>> {
    let mut index = BTreeMap::new();
    let mut keys: BTreeMap<String, &CanonicalName> = BTreeMap::new();
    for (idx, name) in names.enumerate() {
        let key = normalize(name.as_str());
        if key.is_empty() {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if let Some(existing) = keys.get(key.as_str()) {
            return Err(RegistryError::DuplicateEntity {
                level,
                name: name.to_string(),
                key: key.into_string(),
                existing: existing.to_string(),
            });
        }
        keys.insert(key.into_string(), name);
        index.insert(name.to_string(), idx);
    }
    Ok(index)
}
