#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use terr_model::ReferenceData;

use crate::embedded;
use crate::error::{Result, StandardsError};
use crate::hash::sha256_hex;
use crate::loader::{SnapshotSources, build_reference};
use crate::manifest::{MANIFEST_FILE, MANIFEST_SCHEMA, Manifest, ManifestFile};

pub const REQUIRED_ROLES: &[&str] = &["macro_regions", "regions", "provinces", "aliases"];

/// Where a loaded snapshot came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    Embedded,
    Directory(PathBuf),
}

impl ReferenceSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Embedded => "embedded".to_string(),
            Self::Directory(path) => path.display().to_string(),
        }
    }
}

/// A verified snapshot together with its manifest.
#[derive(Debug, Clone)]
pub struct LoadedReference {
    pub data: ReferenceData,
    pub manifest: Manifest,
    pub files: Vec<ManifestFile>,
    pub source: ReferenceSource,
}

/// Load the snapshot compiled into the binary.
pub fn load_embedded() -> Result<LoadedReference> {
    let manifest: Manifest =
        toml::from_str(embedded::MANIFEST).map_err(|e| StandardsError::Toml {
            path: PathBuf::from(MANIFEST_FILE),
            source: e,
        })?;
    validate_manifest(&manifest)?;

    let mut files = manifest.files.clone();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    for file in &files {
        let content = embedded::file(&file.path).ok_or_else(|| StandardsError::MissingFile {
            path: PathBuf::from(&file.path),
        })?;
        verify_bytes(Path::new(&file.path), content.as_bytes(), file)?;
    }

    let sources = SnapshotSources {
        macro_regions: embedded_role(&files, "macro_regions")?,
        regions: embedded_role(&files, "regions")?,
        provinces: embedded_role(&files, "provinces")?,
        aliases: embedded_role(&files, "aliases")?,
    };
    let data = build_reference(&manifest.pins.snapshot, &sources)?;
    Ok(LoadedReference {
        data,
        manifest,
        files,
        source: ReferenceSource::Embedded,
    })
}

/// Load a snapshot directory, verifying every file against `manifest.toml`.
pub fn verify_and_load(dir: &Path) -> Result<LoadedReference> {
    let manifest = load_manifest(&dir.join(MANIFEST_FILE))?;
    validate_manifest(&manifest)?;

    let mut files = manifest.files.clone();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut contents = Vec::with_capacity(files.len());
    for file in &files {
        let content = verify_file(dir, file)?;
        contents.push((file.role.clone(), content));
    }
    let sources = SnapshotSources {
        macro_regions: role_content(&contents, "macro_regions")?,
        regions: role_content(&contents, "regions")?,
        provinces: role_content(&contents, "provinces")?,
        aliases: role_content(&contents, "aliases")?,
    };
    let data = build_reference(&manifest.pins.snapshot, &sources)?;
    tracing::info!(dir = %dir.display(), files = files.len(), "verified reference directory");

    Ok(LoadedReference {
        data,
        manifest,
        files,
        source: ReferenceSource::Directory(dir.to_path_buf()),
    })
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StandardsError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            StandardsError::io(path, e)
        }
    })?;
    toml::from_str(&contents).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest) -> Result<()> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(StandardsError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != 1 {
        return Err(StandardsError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }
    if manifest.pins.snapshot.trim().is_empty() {
        return Err(StandardsError::InvalidManifest {
            message: "pins.snapshot must not be empty".to_string(),
        });
    }

    let mut roles: BTreeSet<&str> = BTreeSet::new();
    for file in &manifest.files {
        if !roles.insert(file.role.as_str()) {
            return Err(StandardsError::DuplicateRole {
                role: file.role.clone(),
            });
        }
        validate_sha(&file.sha256, &file.path)?;
        validate_path(&file.path)?;
    }

    for role in REQUIRED_ROLES {
        if !roles.contains(role) {
            return Err(StandardsError::MissingRole {
                role: role.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_sha(sha: &str, path: &str) -> Result<()> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StandardsError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "expected 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf> {
    let candidate = PathBuf::from(path);
    if path.trim().is_empty() {
        return Err(StandardsError::InvalidPath {
            path: candidate,
            message: "empty path".to_string(),
        });
    }
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(StandardsError::InvalidPath {
                    path: candidate,
                    message: "path must be relative and stay inside the snapshot".to_string(),
                });
            }
        }
    }
    Ok(candidate)
}

fn verify_file(dir: &Path, file: &ManifestFile) -> Result<String> {
    let full_path = dir.join(&file.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StandardsError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            StandardsError::io(full_path.clone(), e)
        }
    })?;
    verify_bytes(&full_path, &bytes, file)?;
    String::from_utf8(bytes).map_err(|e| StandardsError::CsvParse {
        file: file.path.clone(),
        message: format!("not valid UTF-8: {e}"),
    })
}

fn verify_bytes(path: &Path, bytes: &[u8], file: &ManifestFile) -> Result<()> {
    let actual = sha256_hex(bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(StandardsError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn role_content<'a>(contents: &'a [(String, String)], role: &str) -> Result<&'a str> {
    contents
        .iter()
        .find(|(name, _)| name == role)
        .map(|(_, content)| content.as_str())
        .ok_or_else(|| StandardsError::MissingRole {
            role: role.to_string(),
        })
}

fn embedded_role(files: &[ManifestFile], role: &str) -> Result<&'static str> {
    let file = files
        .iter()
        .find(|f| f.role == role)
        .ok_or_else(|| StandardsError::MissingRole {
            role: role.to_string(),
        })?;
    embedded::file(&file.path).ok_or_else(|| StandardsError::MissingFile {
        path: PathBuf::from(&file.path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_escaping_paths() {
        assert!(validate_path("../regions.csv").is_err());
        assert!(validate_path("/etc/regions.csv").is_err());
        assert!(validate_path("istat/regions.csv").is_ok());
    }

    #[test]
    fn rejects_malformed_sha() {
        assert!(validate_sha("abc", "regions.csv").is_err());
        assert!(validate_sha(&"g".repeat(64), "regions.csv").is_err());
        assert!(validate_sha(&"a".repeat(64), "regions.csv").is_ok());
    }
}
