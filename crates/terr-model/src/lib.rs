//! Core types for Italian territory standardization.
//!
//! - [`Level`]: province, region, macro-region
//! - [`CanonicalRegistry`]: the fixed administrative hierarchy
//! - [`AliasTable`]: alternate labels, with explicit ambiguity
//! - [`normalize`]: the lookup-key pipeline
//! - [`ResolutionResult`]: what the resolver hands back per label

#![deny(unsafe_code)]

pub mod alias;
pub mod error;
pub mod ids;
pub mod level;
pub mod normalize;
pub mod reference;
pub mod registry;
pub mod result;

pub use alias::{AliasEntry, AliasLookup, AliasTable, AliasTarget};
pub use error::{AliasConflict, ConflictReason, RegistryError, Result};
pub use ids::CanonicalName;
pub use level::Level;
pub use normalize::{NormalizedKey, STOPWORD_PREFIXES, normalize};
pub use reference::ReferenceData;
pub use registry::{
    CanonicalRegistry, MacroRecord, ProvinceRecord, RegionRecord, RegistryBuilder,
};
pub use result::{Candidate, MatchMethod, ResolutionResult};
