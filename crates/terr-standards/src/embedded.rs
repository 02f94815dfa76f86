//! Embedded reference snapshot.
//!
//! The default snapshot is compiled in with `include_str!()` so the resolver
//! works offline without any path resolution. Its manifest is embedded too and
//! the file hashes are checked on load, exactly like a directory snapshot.

// =============================================================================
// ISTAT 2024
// =============================================================================

/// Label of the embedded snapshot.
pub const SNAPSHOT: &str = "istat-2024";

pub const MANIFEST: &str = include_str!("../data/istat-2024/manifest.toml");

pub const MACRO_REGIONS: &str = include_str!("../data/istat-2024/macro_regions.csv");

pub const REGIONS: &str = include_str!("../data/istat-2024/regions.csv");

pub const PROVINCES: &str = include_str!("../data/istat-2024/provinces.csv");

pub const ALIASES: &str = include_str!("../data/istat-2024/aliases.csv");

/// Embedded file contents keyed by manifest path.
pub fn file(path: &str) -> Option<&'static str> {
    match path {
        "macro_regions.csv" => Some(MACRO_REGIONS),
        "regions.csv" => Some(REGIONS),
        "provinces.csv" => Some(PROVINCES),
        "aliases.csv" => Some(ALIASES),
        _ => None,
    }
}
