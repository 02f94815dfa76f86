use terr_model::{CanonicalRegistry, Level, ResolutionResult, Result};

/// Fill the higher administrative levels of a resolved result.
///
/// - province: region via `region_of`, macro-region via `macro_of`
/// - region: macro-region via `macro_of`
/// - macro-region or unresolved: nothing below it is filled
///
/// Fails only when the registry does not know the canonical, which means the
/// result did not come from this registry.
pub fn backfill(result: ResolutionResult, registry: &CanonicalRegistry) -> Result<ResolutionResult> {
    let mut result = result;
    let Some(canonical) = result.canonical_name.clone() else {
        result.province = None;
        result.region = None;
        result.macro_region = None;
        return Ok(result);
    };

    match result.matched_level {
        Some(Level::Province) => {
            let region = registry.region_of(canonical.as_str())?.clone();
            let macro_region = registry.macro_of(region.as_str())?.clone();
            result.province = Some(canonical);
            result.region = Some(region);
            result.macro_region = Some(macro_region);
        }
        Some(Level::Region) => {
            let macro_region = registry.macro_of(canonical.as_str())?.clone();
            result.province = None;
            result.region = Some(canonical);
            result.macro_region = Some(macro_region);
        }
        Some(Level::Macro) => {
            if registry.macro_region(canonical.as_str()).is_none() {
                return Err(terr_model::RegistryError::UnknownEntity {
                    level: Level::Macro,
                    name: canonical.to_string(),
                });
            }
            result.province = None;
            result.region = None;
            result.macro_region = Some(canonical);
        }
        None => {
            result.province = None;
            result.region = None;
            result.macro_region = None;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use terr_model::{CanonicalName, MatchMethod};

    use super::*;

    fn registry() -> CanonicalRegistry {
        let mut builder = CanonicalRegistry::builder("test");
        builder.add_macro("Isole", None).unwrap();
        builder.add_region("Sardegna", "Isole", None).unwrap();
        builder.add_province("Nuoro", "Sardegna", Some("NU"), false).unwrap();
        builder.build().unwrap()
    }

    fn matched(level: Level, name: &str) -> ResolutionResult {
        ResolutionResult::matched(
            name,
            level,
            CanonicalName::new(name).unwrap(),
            MatchMethod::Exact,
            1.0,
        )
    }

    #[test]
    fn province_fills_region_and_macro() {
        let result = backfill(matched(Level::Province, "Nuoro"), &registry()).unwrap();
        assert_eq!(result.province.unwrap(), "Nuoro");
        assert_eq!(result.region.unwrap(), "Sardegna");
        assert_eq!(result.macro_region.unwrap(), "Isole");
    }

    #[test]
    fn region_fills_macro_only() {
        let result = backfill(matched(Level::Region, "Sardegna"), &registry()).unwrap();
        assert!(result.province.is_none());
        assert_eq!(result.region.unwrap(), "Sardegna");
        assert_eq!(result.macro_region.unwrap(), "Isole");
    }

    #[test]
    fn macro_leaves_lower_levels_empty() {
        let result = backfill(matched(Level::Macro, "Isole"), &registry()).unwrap();
        assert!(result.province.is_none());
        assert!(result.region.is_none());
        assert_eq!(result.macro_region.unwrap(), "Isole");
    }

    #[test]
    fn unresolved_stays_empty() {
        let result = backfill(ResolutionResult::unresolved("Xyzzy"), &registry()).unwrap();
        assert!(result.region.is_none() && result.macro_region.is_none());
    }

    #[test]
    fn foreign_canonical_is_an_error() {
        assert!(backfill(matched(Level::Province, "Roma"), &registry()).is_err());
    }
}
