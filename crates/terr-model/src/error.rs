use std::fmt;

use thiserror::Error;

use crate::level::Level;

/// A single alias that cannot be loaded as-is.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AliasConflict {
    /// Normalized alias key.
    pub alias: String,
    pub level: Level,
    /// Canonical names the alias points to (or collides with).
    pub canonicals: Vec<String>,
    pub reason: ConflictReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// Same alias maps to several canonicals without an ambiguity flag.
    UnflaggedMultiTarget,
    /// Alias normalizes to another canonical's own name.
    ShadowsCanonical,
}

impl fmt::Display for AliasConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            ConflictReason::UnflaggedMultiTarget => "maps to several canonicals without ambiguity flag",
            ConflictReason::ShadowsCanonical => "shadows another canonical name",
        };
        write!(
            f,
            "'{}' ({}) {}: {}",
            self.alias,
            self.level,
            reason,
            self.canonicals.join(" | ")
        )
    }
}

/// Errors raised while building or querying reference data.
///
/// Per-label resolution never produces these; they signal broken reference
/// data or an internal inconsistency.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("unknown {level} '{name}'")]
    UnknownEntity { level: Level, name: String },

    #[error("duplicate {level} '{name}' (normalized key '{key}' already used by '{existing}')")]
    DuplicateEntity {
        level: Level,
        name: String,
        key: String,
        existing: String,
    },

    #[error("malformed hierarchy: {message}")]
    MalformedHierarchy { message: String },

    #[error("invalid canonical name '{0}'")]
    InvalidName(String),

    #[error("invalid alias '{alias}': {message}")]
    InvalidAlias { alias: String, message: String },

    #[error("invalid level '{0}'")]
    InvalidLevel(String),

    #[error("conflicting aliases: {}", join_conflicts(.conflicts))]
    ConflictingAlias { conflicts: Vec<AliasConflict> },
}

impl RegistryError {
    pub(crate) fn unknown(level: Level, name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            level,
            name: name.into(),
        }
    }
}

fn join_conflicts(conflicts: &[AliasConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, RegistryError>;
