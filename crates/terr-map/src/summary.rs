//! Aggregate view over a batch of resolution results.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use terr_model::{Level, MatchMethod, ResolutionResult};

/// Counts and review lists for one resolved batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub total: usize,
    pub by_method: BTreeMap<MatchMethod, usize>,
    pub by_level: BTreeMap<Level, usize>,
    /// Distinct unresolved labels, first-seen order.
    pub unresolved: Vec<String>,
    /// Distinct ambiguous labels, first-seen order.
    pub ambiguous: Vec<String>,
    /// Mean confidence of fuzzy matches; `None` when there were none.
    pub mean_fuzzy_confidence: Option<f64>,
}

impl ResolutionSummary {
    pub fn from_results(results: &[ResolutionResult]) -> Self {
        let mut by_method: BTreeMap<MatchMethod, usize> = BTreeMap::new();
        let mut by_level: BTreeMap<Level, usize> = BTreeMap::new();
        let mut unresolved = Vec::new();
        let mut ambiguous = Vec::new();
        let mut seen_unresolved = BTreeSet::new();
        let mut seen_ambiguous = BTreeSet::new();
        let mut fuzzy_total = 0.0;
        let mut fuzzy_count = 0usize;

        for result in results {
            *by_method.entry(result.method).or_default() += 1;
            if let Some(level) = result.matched_level {
                *by_level.entry(level).or_default() += 1;
            }
            match result.method {
                MatchMethod::Unresolved => {
                    if seen_unresolved.insert(result.input_text.as_str()) {
                        unresolved.push(result.input_text.clone());
                    }
                }
                MatchMethod::AmbiguousAlias | MatchMethod::AmbiguousFuzzy => {
                    if seen_ambiguous.insert(result.input_text.as_str()) {
                        ambiguous.push(result.input_text.clone());
                    }
                }
                MatchMethod::Fuzzy => {
                    fuzzy_total += result.confidence;
                    fuzzy_count += 1;
                }
                MatchMethod::Exact | MatchMethod::Alias | MatchMethod::Normalized => {}
            }
        }

        Self {
            total: results.len(),
            by_method,
            by_level,
            unresolved,
            ambiguous,
            mean_fuzzy_confidence: (fuzzy_count > 0).then(|| fuzzy_total / fuzzy_count as f64),
        }
    }

    pub fn count(&self, method: MatchMethod) -> usize {
        self.by_method.get(&method).copied().unwrap_or(0)
    }

    pub fn resolved(&self) -> usize {
        self.by_method
            .iter()
            .filter(|(method, _)| method.is_resolved())
            .map(|(_, count)| count)
            .sum()
    }

    /// Share of labels that resolved, in `[0, 1]`. An empty batch counts as
    /// fully resolved.
    pub fn resolution_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.resolved() as f64 / self.total as f64
        }
    }

    pub fn needs_review(&self) -> usize {
        self.total - self.resolved()
    }
}

#[cfg(test)]
mod tests {
    use terr_model::{Candidate, CanonicalName};

    use super::*;

    fn name(value: &str) -> CanonicalName {
        CanonicalName::new(value).unwrap()
    }

    #[test]
    fn counts_methods_and_dedups_review_lists() {
        let results = vec![
            ResolutionResult::matched("Roma", Level::Province, name("Roma"), MatchMethod::Exact, 1.0),
            ResolutionResult::matched(
                "Bergamoo",
                Level::Province,
                name("Bergamo"),
                MatchMethod::Fuzzy,
                0.9,
            ),
            ResolutionResult::matched(
                "Sardegn",
                Level::Region,
                name("Sardegna"),
                MatchMethod::Fuzzy,
                0.8,
            ),
            ResolutionResult::unresolved("Xyzzy"),
            ResolutionResult::unresolved("Xyzzy"),
            ResolutionResult::ambiguous(
                "Reggio",
                MatchMethod::AmbiguousAlias,
                vec![Candidate {
                    name: name("Reggio Emilia"),
                    level: Level::Province,
                    score: 1.0,
                }],
            ),
        ];

        let summary = ResolutionSummary::from_results(&results);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.count(MatchMethod::Fuzzy), 2);
        assert_eq!(summary.count(MatchMethod::Unresolved), 2);
        assert_eq!(summary.count(MatchMethod::Alias), 0);
        assert_eq!(summary.by_level[&Level::Province], 2);
        assert_eq!(summary.by_level[&Level::Region], 1);
        assert_eq!(summary.unresolved, vec!["Xyzzy".to_string()]);
        assert_eq!(summary.ambiguous, vec!["Reggio".to_string()]);
        assert!((summary.mean_fuzzy_confidence.unwrap() - 0.85).abs() < 1e-9);
        assert_eq!(summary.resolved(), 3);
        assert_eq!(summary.needs_review(), 3);
        assert!((summary.resolution_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_batch() {
        let summary = ResolutionSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.mean_fuzzy_confidence.is_none());
        assert_eq!(summary.resolution_rate(), 1.0);
    }
}
