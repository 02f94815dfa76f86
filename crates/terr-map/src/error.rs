//! Error types for resolver configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or validating resolver configuration.
///
/// Resolving a label never fails; only setting a resolver up can.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid fuzzy policy: {message}")]
    InvalidPolicy { message: String },

    #[error("unknown similarity metric '{0}' (expected indel, jaro_winkler or levenshtein)")]
    UnknownMetric(String),
}
