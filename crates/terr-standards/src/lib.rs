//! Versioned reference snapshots for Italian territory standardization.
//!
//! A snapshot is four CSV files (macro-regions, regions, provinces, aliases)
//! pinned by a `manifest.toml` carrying their sha256. The ISTAT 2024 snapshot
//! is embedded in the binary; a directory snapshot can replace it when the
//! administrative map changes (e.g. the 2025 Sardinian provinces) without
//! touching code.
//!
//! ```text
//! <snapshot>/
//! ├── manifest.toml
//! ├── macro_regions.csv   code,name
//! ├── regions.csv         code,name,macro_region
//! ├── provinces.csv       sigla,name,region,metropolitan
//! └── aliases.csv         alias,canonical,level,ambiguous
//! ```

#![deny(unsafe_code)]

pub mod doctor;
pub mod embedded;
pub mod error;
pub mod hash;
pub mod loader;
pub mod manifest;
pub mod paths;
pub mod rows;
pub mod snapshot;

pub use crate::doctor::DoctorReport;
pub use crate::error::{Result, StandardsError};
pub use crate::loader::{SnapshotSources, build_reference};
pub use crate::paths::{REFERENCE_ENV_VAR, load_reference, reference_dir};
pub use crate::snapshot::{LoadedReference, ReferenceSource, load_embedded, verify_and_load};
