use terr_model::{AliasLookup, Level};
use terr_standards::{ReferenceSource, load_embedded};

#[test]
fn embedded_snapshot_has_full_hierarchy() {
    let reference = load_embedded().expect("embedded snapshot loads");
    let registry = &reference.data.registry;

    assert_eq!(reference.source, ReferenceSource::Embedded);
    assert_eq!(registry.snapshot(), "istat-2024");
    assert_eq!(registry.count(Level::Macro), 5);
    assert_eq!(registry.count(Level::Region), 20);
    assert_eq!(registry.count(Level::Province), 107);

    for province in registry.list_provinces() {
        let region = registry.region_of(province.as_str()).expect("province has region");
        registry.macro_of(region.as_str()).expect("region has macro-region");
    }
    for macro_region in registry.list_macros() {
        assert!(!registry.regions_in(macro_region.as_str()).unwrap().is_empty());
    }
}

#[test]
fn known_hierarchy_links() {
    let reference = load_embedded().unwrap();
    let registry = &reference.data.registry;

    assert_eq!(registry.region_of("Forlì-Cesena").unwrap(), "Emilia-Romagna");
    assert_eq!(registry.macro_of("Emilia-Romagna").unwrap(), "Nord-est");
    assert_eq!(registry.region_of("Sud Sardegna").unwrap(), "Sardegna");
    assert_eq!(registry.macro_of("Sardegna").unwrap(), "Isole");
    assert_eq!(
        registry.macro_of("Valle d'Aosta/Vallée d'Aoste").unwrap(),
        "Nord-ovest"
    );
    assert_eq!(registry.provinces_in("Lombardia").unwrap().len(), 12);
    assert!(registry.province("Roma").unwrap().metropolitan);
    assert!(!registry.province("Latina").unwrap().metropolitan);
}

#[test]
fn sigle_and_manual_aliases_resolve() {
    let reference = load_embedded().unwrap();
    let aliases = &reference.data.aliases;

    let target = |text: &str, level: Level| match aliases.canonical_for(text, level) {
        AliasLookup::Found(target) => Some(target.canonical.to_string()),
        _ => None,
    };
    assert_eq!(target("RM", Level::Province).as_deref(), Some("Roma"));
    assert_eq!(
        target("Reggio nell'Emilia", Level::Province).as_deref(),
        Some("Reggio Emilia")
    );
    assert_eq!(
        target("B.A.T.", Level::Province).as_deref(),
        Some("Barletta-Andria-Trani")
    );
    assert_eq!(target("Lombardy", Level::Region).as_deref(), Some("Lombardia"));
    assert_eq!(target("Nordest", Level::Macro).as_deref(), Some("Nord-est"));
    assert!(matches!(
        aliases.canonical_for("Reggio", Level::Province),
        AliasLookup::Ambiguous(ref targets) if targets.len() == 2
    ));
}
