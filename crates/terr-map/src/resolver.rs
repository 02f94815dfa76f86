//! The matching pipeline.
//!
//! Stages, first hit wins:
//!
//! 1. **exact**: the trimmed label is a canonical name
//! 2. **alias**: the normalized label is a known alias key
//! 3. **normalized**: the normalized label equals a normalized canonical name
//! 4. **fuzzy**: best similarity against canonical and alias keys, accepted
//!    only above the threshold and clear of the runner-up by the margin
//! 5. **unresolved**
//!
//! Within a stage, levels are tried in precedence order (province, region,
//! macro-region) unless a level hint restricts the search to one level.

use std::collections::BTreeMap;
use std::sync::Arc;

use terr_model::{
    AliasLookup, Candidate, CanonicalName, Level, MatchMethod, NormalizedKey, ReferenceData,
    ResolutionResult, normalize,
};

use crate::backfill::backfill;
use crate::error::ConfigError;
use crate::index::LevelIndex;
use crate::policy::FuzzyPolicy;

#[derive(Debug)]
enum FuzzyOutcome {
    Accepted(Candidate),
    Ambiguous(Vec<Candidate>),
    NoMatch,
}

/// Resolves raw territory labels against injected reference data.
///
/// Cheap to share: all state is read-only after construction.
#[derive(Debug, Clone)]
pub struct Resolver {
    reference: Arc<ReferenceData>,
    policy: FuzzyPolicy,
    provinces: Arc<LevelIndex>,
    regions: Arc<LevelIndex>,
    macros: Arc<LevelIndex>,
}

impl Resolver {
    pub fn new(reference: Arc<ReferenceData>, policy: FuzzyPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self::build(reference, policy))
    }

    /// Resolver with the default fuzzy policy.
    pub fn with_defaults(reference: Arc<ReferenceData>) -> Self {
        Self::build(reference, FuzzyPolicy::default())
    }

    fn build(reference: Arc<ReferenceData>, policy: FuzzyPolicy) -> Self {
        let provinces = Arc::new(LevelIndex::build(&reference, Level::Province));
        let regions = Arc::new(LevelIndex::build(&reference, Level::Region));
        let macros = Arc::new(LevelIndex::build(&reference, Level::Macro));
        tracing::info!(
            snapshot = reference.snapshot(),
            metric = %policy.metric,
            threshold = policy.threshold,
            margin = policy.margin,
            fuzzy = policy.enabled,
            "resolver ready"
        );
        Self {
            reference,
            policy,
            provinces,
            regions,
            macros,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn policy(&self) -> &FuzzyPolicy {
        &self.policy
    }

    fn index(&self, level: Level) -> &LevelIndex {
        match level {
            Level::Province => &self.provinces,
            Level::Region => &self.regions,
            Level::Macro => &self.macros,
        }
    }

    /// Resolve one label. Never fails: unresolved and ambiguous outcomes are
    /// reported through [`MatchMethod`].
    pub fn resolve(&self, label: &str, hint: Option<Level>) -> ResolutionResult {
        let levels = Level::search_order(hint);
        let trimmed = label.trim();
        let registry = &self.reference.registry;

        for &level in levels {
            if let Some(canonical) = registry.canonical(level, trimmed) {
                return self.finish(ResolutionResult::matched(
                    label,
                    level,
                    canonical.clone(),
                    MatchMethod::Exact,
                    1.0,
                ));
            }
        }

        let key = normalize(label);
        if key.is_empty() {
            tracing::trace!(label, "empty key after normalization");
            return ResolutionResult::unresolved(label);
        }

        match self.reference.aliases.lookup_key(&key, hint) {
            AliasLookup::Found(target) => {
                return self.finish(ResolutionResult::matched(
                    label,
                    target.level,
                    target.canonical,
                    MatchMethod::Alias,
                    1.0,
                ));
            }
            AliasLookup::Ambiguous(targets) => {
                tracing::debug!(label, key = %key, targets = targets.len(), "ambiguous alias");
                let candidates = targets
                    .into_iter()
                    .map(|target| Candidate {
                        name: target.canonical,
                        level: target.level,
                        score: 1.0,
                    })
                    .collect();
                return ResolutionResult::ambiguous(label, MatchMethod::AmbiguousAlias, candidates);
            }
            AliasLookup::NotFound => {}
        }

        for &level in levels {
            if let Some(canonical) = self.index(level).normalized.get(key.as_str()) {
                return self.finish(ResolutionResult::matched(
                    label,
                    level,
                    canonical.clone(),
                    MatchMethod::Normalized,
                    1.0,
                ));
            }
        }

        if self.policy.enabled && key.char_len() >= self.policy.min_key_len {
            for &level in levels {
                match self.fuzzy(&key, level) {
                    FuzzyOutcome::Accepted(candidate) => {
                        tracing::debug!(
                            label,
                            canonical = %candidate.name,
                            %level,
                            score = candidate.score,
                            "fuzzy match accepted"
                        );
                        return self.finish(ResolutionResult::matched(
                            label,
                            level,
                            candidate.name,
                            MatchMethod::Fuzzy,
                            candidate.score,
                        ));
                    }
                    FuzzyOutcome::Ambiguous(candidates) => {
                        tracing::debug!(
                            label,
                            %level,
                            candidates = candidates.len(),
                            "fuzzy candidates within margin"
                        );
                        return ResolutionResult::ambiguous(
                            label,
                            MatchMethod::AmbiguousFuzzy,
                            candidates,
                        );
                    }
                    FuzzyOutcome::NoMatch => {}
                }
            }
        }

        tracing::trace!(label, key = %key, "unresolved");
        ResolutionResult::unresolved(label)
    }

    fn fuzzy(&self, key: &NormalizedKey, level: Level) -> FuzzyOutcome {
        let metric = self.policy.metric;
        let mut best: BTreeMap<&CanonicalName, f64> = BTreeMap::new();
        for candidate in &self.index(level).fuzzy_keys {
            if candidate.char_len < self.policy.min_key_len {
                continue;
            }
            let score = metric.score(key.as_str(), &candidate.key);
            let entry = best.entry(&candidate.canonical).or_insert(0.0);
            if score > *entry {
                *entry = score;
            }
        }

        let mut ranked: Vec<(&CanonicalName, f64)> = best.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let Some(&(top, top_score)) = ranked.first() else {
            return FuzzyOutcome::NoMatch;
        };
        if top_score < self.policy.threshold {
            return FuzzyOutcome::NoMatch;
        }

        let to_candidate = |(name, score): &(&CanonicalName, f64)| Candidate {
            name: (*name).clone(),
            level,
            score: *score,
        };
        let rivals: Vec<Candidate> = ranked
            .iter()
            .skip(1)
            .take_while(|(_, score)| top_score - score < self.policy.margin)
            .map(to_candidate)
            .collect();
        let accepted = Candidate {
            name: top.clone(),
            level,
            score: top_score,
        };
        if rivals.is_empty() {
            FuzzyOutcome::Accepted(accepted)
        } else {
            let mut candidates = Vec::with_capacity(rivals.len() + 1);
            candidates.push(accepted);
            candidates.extend(rivals);
            FuzzyOutcome::Ambiguous(candidates)
        }
    }

    fn finish(&self, result: ResolutionResult) -> ResolutionResult {
        let input = result.input_text.clone();
        match backfill(result, &self.reference.registry) {
            Ok(result) => {
                tracing::trace!(
                    label = %result.input_text,
                    method = %result.method,
                    canonical = ?result.canonical_name,
                    "resolved"
                );
                result
            }
            Err(error) => {
                tracing::error!(label = %input, %error, "hierarchy backfill failed");
                ResolutionResult::unresolved(input)
            }
        }
    }

    /// Resolve every label, preserving order and count.
    pub fn resolve_all<I, S>(&self, labels: I, hint: Option<Level>) -> Vec<ResolutionResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_iter(labels, hint).collect()
    }

    /// Lazily resolve a sequence of labels.
    pub fn resolve_iter<I, S>(
        &self,
        labels: I,
        hint: Option<Level>,
    ) -> impl Iterator<Item = ResolutionResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(move |label| self.resolve(label.as_ref(), hint))
    }

    /// Resolve labels that each carry their own level hint.
    pub fn resolve_hinted<I, S>(&self, items: I) -> Vec<ResolutionResult>
    where
        I: IntoIterator<Item = (S, Option<Level>)>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .map(|(label, hint)| self.resolve(label.as_ref(), hint))
            .collect()
    }
}
