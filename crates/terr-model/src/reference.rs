#![deny(unsafe_code)]

use crate::alias::{AliasEntry, AliasTable};
use crate::error::Result;
use crate::registry::CanonicalRegistry;

/// Registry plus alias table: everything the resolver consults.
///
/// Built once and handed to the resolver explicitly, so tests can swap in
/// small synthetic data.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub registry: CanonicalRegistry,
    pub aliases: AliasTable,
}

impl ReferenceData {
    pub fn new(
        registry: CanonicalRegistry,
        aliases: impl IntoIterator<Item = AliasEntry>,
    ) -> Result<Self> {
        let aliases = AliasTable::build(aliases, &registry)?;
        Ok(Self { registry, aliases })
    }

    pub fn snapshot(&self) -> &str {
        self.registry.snapshot()
    }
}
