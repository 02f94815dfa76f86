//! Territory label resolution.
//!
//! [`Resolver`] turns raw labels into canonical territories using injected
//! [`terr_model::ReferenceData`]. Matching is deterministic first (exact,
//! alias, normalized) and only then fuzzy, under a [`FuzzyPolicy`]. Every
//! resolved result is backfilled with its region and macro-region.

#![deny(unsafe_code)]

pub mod backfill;
pub mod error;
mod index;
pub mod policy;
pub mod resolver;
pub mod summary;

pub use backfill::backfill;
pub use error::ConfigError;
pub use policy::{FuzzyPolicy, ResolverConfig, SimilarityMetric};
pub use resolver::Resolver;
pub use summary::ResolutionSummary;
