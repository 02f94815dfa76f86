#![deny(unsafe_code)]

use terr_model::Level;

use crate::manifest::{ManifestFile, Pins};
use crate::snapshot::LoadedReference;

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    pub source: String,
    pub pins: Pins,
    pub files: Vec<ManifestFile>,
    pub counts: DoctorCounts,
    pub ambiguous_aliases: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorCounts {
    pub files: usize,
    pub macro_regions: usize,
    pub regions: usize,
    pub provinces: usize,
    pub metropolitan_cities: usize,
    pub aliases: usize,
}

impl DoctorReport {
    pub fn from_reference(reference: &LoadedReference) -> Self {
        let registry = &reference.data.registry;
        let aliases = &reference.data.aliases;
        Self {
            schema: "territori.reference-doctor".to_string(),
            schema_version: 1,
            source: reference.source.describe(),
            pins: reference.manifest.pins.clone(),
            files: reference.files.clone(),
            counts: DoctorCounts {
                files: reference.files.len(),
                macro_regions: registry.count(Level::Macro),
                regions: registry.count(Level::Region),
                provinces: registry.count(Level::Province),
                metropolitan_cities: registry
                    .provinces()
                    .iter()
                    .filter(|p| p.metropolitan)
                    .count(),
                aliases: aliases.len(),
            },
            ambiguous_aliases: aliases.ambiguous_keys().map(str::to_string).collect(),
        }
    }
}
