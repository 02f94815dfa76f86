//! Reference snapshot selection.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::snapshot::{LoadedReference, load_embedded, verify_and_load};

/// Environment variable naming a snapshot directory to use instead of the
/// embedded one.
pub const REFERENCE_ENV_VAR: &str = "TERRITORI_REFERENCE_DIR";

/// Snapshot directory to load, if any.
///
/// Resolution order:
/// 1. `explicit` (e.g. the `--reference-dir` flag)
/// 2. `TERRITORI_REFERENCE_DIR` environment variable
/// 3. `None`: use the embedded snapshot
pub fn reference_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    std::env::var_os(REFERENCE_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Load the selected snapshot.
pub fn load_reference(explicit: Option<&Path>) -> Result<LoadedReference> {
    match reference_dir(explicit) {
        Some(dir) => verify_and_load(&dir),
        None => load_embedded(),
    }
}
