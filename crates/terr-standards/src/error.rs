//! Error types for reference snapshot loading.

use std::path::PathBuf;

use terr_model::RegistryError;
use thiserror::Error;

/// Errors that can occur when loading or verifying a reference snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("missing required role in manifest: {role}")]
    MissingRole { role: String },

    #[error("duplicate role in manifest: {role}")]
    DuplicateRole { role: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("missing file listed in manifest: {path}")]
    MissingFile { path: PathBuf },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to parse CSV {file}: {message}")]
    CsvParse { file: String, message: String },

    #[error("reference data in {file} is inconsistent: {source}")]
    Registry {
        file: String,
        #[source]
        source: RegistryError,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn registry(file: impl Into<String>, source: RegistryError) -> Self {
        Self::Registry {
            file: file.into(),
            source,
        }
    }
}

/// Result type for reference loading operations.
pub type Result<T> = std::result::Result<T, StandardsError>;
