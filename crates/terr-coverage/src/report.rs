//! Manual-review report for a standardization run.

use std::path::Path;

use serde::Serialize;
use terr_map::ResolutionSummary;
use terr_model::{MatchMethod, ResolutionResult};

use crate::error::Result;
use crate::tidy::write_csv;

/// One label that needs a human decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    pub input_text: String,
    pub method: MatchMethod,
    /// `name (level, score)` entries separated by `; `.
    pub candidates: String,
}

impl ReviewRow {
    fn from_result(result: &ResolutionResult) -> Self {
        let candidates = result
            .candidates
            .iter()
            .map(|c| format!("{} ({}, {:.3})", c.name, c.level, c.score))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            input_text: result.input_text.clone(),
            method: result.method,
            candidates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub summary: ResolutionSummary,
    pub review: Vec<ReviewRow>,
}

impl ResolutionReport {
    /// Build from per-label results; duplicates are reported once.
    pub fn from_results(results: &[ResolutionResult]) -> Self {
        let summary = ResolutionSummary::from_results(results);
        let mut seen = std::collections::HashSet::new();
        let review = results
            .iter()
            .filter(|r| r.needs_review() && seen.insert(r.input_text.as_str()))
            .map(ReviewRow::from_result)
            .collect();
        Self { summary, review }
    }

    pub fn is_clean(&self) -> bool {
        self.review.is_empty()
    }

    pub fn write_review_csv(&self, path: &Path) -> Result<()> {
        write_csv(path, &self.review)
    }
}

#[cfg(test)]
mod tests {
    use terr_model::{Candidate, CanonicalName, Level};

    use super::*;

    #[test]
    fn review_lists_unresolved_and_ambiguous_once() {
        let ambiguous = ResolutionResult::ambiguous(
            "Reggio",
            MatchMethod::AmbiguousAlias,
            vec![
                Candidate {
                    name: CanonicalName::new("Reggio Calabria").unwrap(),
                    level: Level::Province,
                    score: 1.0,
                },
                Candidate {
                    name: CanonicalName::new("Reggio Emilia").unwrap(),
                    level: Level::Province,
                    score: 1.0,
                },
            ],
        );
        let results = vec![
            ResolutionResult::matched(
                "Roma",
                Level::Province,
                CanonicalName::new("Roma").unwrap(),
                MatchMethod::Exact,
                1.0,
            ),
            ambiguous.clone(),
            ResolutionResult::unresolved("Xyzzy"),
            ambiguous,
        ];

        let report = ResolutionReport::from_results(&results);
        assert!(!report.is_clean());
        assert_eq!(report.review.len(), 2);
        assert_eq!(
            report.review[0].candidates,
            "Reggio Calabria (province, 1.000); Reggio Emilia (province, 1.000)"
        );
        assert_eq!(report.review[1].method, MatchMethod::Unresolved);
        assert_eq!(report.review[1].candidates, "");
        assert_eq!(report.summary.total, 4);
    }

    #[test]
    fn writes_review_csv() {
        let report = ResolutionReport::from_results(&[ResolutionResult::unresolved("Xyzzy")]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.csv");
        report.write_review_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("input_text,method,candidates"));
        assert!(text.contains("Xyzzy,unresolved,"));
    }
}
