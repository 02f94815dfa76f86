//! Error types for tidy tables and coverage analysis.

use std::path::PathBuf;

use terr_model::Level;
use thiserror::Error;

/// Errors reading, writing or reshaping tidy tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TidyError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no rows")]
    Empty { path: PathBuf },

    #[error("invalid value '{value}' in {column} at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid year '{value}' at {location}")]
    InvalidYear { location: String, value: String },

    #[error("invalid wide layout: {message}")]
    InvalidLayout { message: String },
}

impl TidyError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }
}

/// Errors from coverage analysis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoverageError {
    #[error("coverage is computed at province or region level, not {0}")]
    UnsupportedLevel(Level),

    #[error("invalid filter '{clause}': {message}")]
    InvalidFilter { clause: String, message: String },

    #[error("unknown expected universe '{0}' (expected all or by-year)")]
    UnknownUniverse(String),

    #[error("no coverage rows to arrange")]
    NoData,
}

pub type Result<T> = std::result::Result<T, TidyError>;
