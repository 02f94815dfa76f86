//! Fuzzy matching policy and resolver configuration.
//!
//! The policy is plain data: metric, acceptance threshold, ambiguity margin.
//! It can come from defaults, a preset, a TOML file, or CLI flags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rapidfuzz::distance::{indel, jaro_winkler, levenshtein};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// String similarity used by the fuzzy stage. All metrics return `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// `1 - indel_distance / (len_a + len_b)`: the classic close-match ratio.
    #[default]
    Indel,
    JaroWinkler,
    /// `1 - levenshtein_distance / max(len_a, len_b)`.
    Levenshtein,
}

impl SimilarityMetric {
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::Indel => indel::normalized_similarity(a.chars(), b.chars()),
            Self::JaroWinkler => jaro_winkler::similarity(a.chars(), b.chars()),
            Self::Levenshtein => levenshtein::normalized_similarity(a.chars(), b.chars()),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Indel => "indel",
            Self::JaroWinkler => "jaro_winkler",
            Self::Levenshtein => "levenshtein",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "indel" | "ratio" => Ok(Self::Indel),
            "jaro_winkler" | "jarowinkler" => Ok(Self::JaroWinkler),
            "levenshtein" => Ok(Self::Levenshtein),
            _ => Err(ConfigError::UnknownMetric(s.to_string())),
        }
    }
}

/// Acceptance rules for fuzzy matches.
///
/// The best candidate is accepted when it scores at least `threshold` and
/// beats the runner-up canonical by at least `margin`. A runner-up within the
/// margin makes the outcome ambiguous. A margin of 0 disables the ambiguity
/// check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuzzyPolicy {
    pub enabled: bool,
    pub metric: SimilarityMetric,
    pub threshold: f64,
    pub margin: f64,
    /// Keys shorter than this (in characters) never take part in fuzzy
    /// matching, on either side.
    pub min_key_len: usize,
}

impl Default for FuzzyPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            metric: SimilarityMetric::Indel,
            threshold: 0.90,
            margin: 0.02,
            min_key_len: 3,
        }
    }
}

impl FuzzyPolicy {
    /// Stricter acceptance for production runs.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            threshold: 0.95,
            margin: 0.03,
            ..Self::default()
        }
    }

    /// Looser acceptance for exploratory cleaning.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            threshold: 0.85,
            ..Self::default()
        }
    }

    /// Deterministic stages only.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidPolicy {
                message: format!("threshold {} outside [0, 1]", self.threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.margin) {
            return Err(ConfigError::InvalidPolicy {
                message: format!("margin {} outside [0, 1]", self.margin),
            });
        }
        Ok(())
    }
}

/// Contents of a resolver configuration file.
///
/// ```toml
/// [fuzzy]
/// metric = "indel"
/// threshold = 0.9
/// margin = 0.02
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub fuzzy: FuzzyPolicy,
}

impl ResolverConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.fuzzy.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indel_matches_close_match_ratio() {
        let score = SimilarityMetric::Indel.score("sardegna", "sud sardegna");
        assert!((score - 0.8).abs() < 1e-9);
        assert_eq!(SimilarityMetric::Indel.score("roma", "roma"), 1.0);
    }

    #[test]
    fn metrics_parse_by_name() {
        assert_eq!(
            "jaro-winkler".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::JaroWinkler
        );
        assert!("soundex".parse::<SimilarityMetric>().is_err());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ResolverConfig::from_toml_str(
            "[fuzzy]\nthreshold = 0.95\n",
            Path::new("resolver.toml"),
        )
        .unwrap();
        assert_eq!(config.fuzzy.threshold, 0.95);
        assert_eq!(config.fuzzy.margin, 0.02);
        assert_eq!(config.fuzzy.metric, SimilarityMetric::Indel);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = ResolverConfig::from_toml_str(
            "[fuzzy]\nthreshold = 1.5\n",
            Path::new("resolver.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPolicy { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(
            ResolverConfig::from_toml_str("[fuzzy]\ncutoff = 0.9\n", Path::new("x.toml")).is_err()
        );
    }
}
