//! Resolution results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::CanonicalName;
use crate::level::Level;

/// How a label was (or was not) resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Alias,
    Normalized,
    Fuzzy,
    /// Alias known but shared by several canonicals.
    AmbiguousAlias,
    /// Two or more fuzzy candidates scored within the acceptance margin.
    AmbiguousFuzzy,
    Unresolved,
}

impl MatchMethod {
    pub const ALL: [MatchMethod; 7] = [
        Self::Exact,
        Self::Alias,
        Self::Normalized,
        Self::Fuzzy,
        Self::AmbiguousAlias,
        Self::AmbiguousFuzzy,
        Self::Unresolved,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Alias => "alias",
            Self::Normalized => "normalized",
            Self::Fuzzy => "fuzzy",
            Self::AmbiguousAlias => "ambiguous_alias",
            Self::AmbiguousFuzzy => "ambiguous_fuzzy",
            Self::Unresolved => "unresolved",
        }
    }

    /// Deterministic methods always carry confidence 1.0.
    pub const fn is_deterministic(&self) -> bool {
        matches!(self, Self::Exact | Self::Alias | Self::Normalized)
    }

    pub const fn is_resolved(&self) -> bool {
        matches!(
            self,
            Self::Exact | Self::Alias | Self::Normalized | Self::Fuzzy
        )
    }

    pub const fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousAlias | Self::AmbiguousFuzzy)
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competing canonical reported alongside an ambiguous outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: CanonicalName,
    pub level: Level,
    pub score: f64,
}

/// Outcome of resolving one label. Never mutated after being returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub input_text: String,
    pub matched_level: Option<Level>,
    pub canonical_name: Option<CanonicalName>,
    pub province: Option<CanonicalName>,
    pub region: Option<CanonicalName>,
    #[serde(rename = "macro")]
    pub macro_region: Option<CanonicalName>,
    pub method: MatchMethod,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
}

impl ResolutionResult {
    /// A resolved result before hierarchy backfill.
    pub fn matched(
        input_text: impl Into<String>,
        level: Level,
        canonical: CanonicalName,
        method: MatchMethod,
        confidence: f64,
    ) -> Self {
        Self {
            input_text: input_text.into(),
            matched_level: Some(level),
            canonical_name: Some(canonical),
            province: None,
            region: None,
            macro_region: None,
            method,
            confidence,
            candidates: Vec::new(),
        }
    }

    pub fn unresolved(input_text: impl Into<String>) -> Self {
        Self::ambiguous(input_text, MatchMethod::Unresolved, Vec::new())
    }

    /// An unresolved outcome carrying the candidates that blocked resolution.
    pub fn ambiguous(
        input_text: impl Into<String>,
        method: MatchMethod,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self {
            input_text: input_text.into(),
            matched_level: None,
            canonical_name: None,
            province: None,
            region: None,
            macro_region: None,
            method,
            confidence: 0.0,
            candidates,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.canonical_name.is_some()
    }

    /// Unresolved and ambiguous results need a human look.
    pub fn needs_review(&self) -> bool {
        !self.is_resolved()
    }
}
