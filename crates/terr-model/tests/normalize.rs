use proptest::prelude::*;

use terr_model::normalize;

proptest! {
    #[test]
    fn normalize_is_idempotent(input in ".{0,40}") {
        let once = normalize(&input);
        let twice = normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_accepts_label_like_text(
        prefix in prop::sample::select(vec!["", "Provincia di ", "Città metropolitana di ", "Regione "]),
        body in "[A-Za-zÀ-ÿ' .\\-/]{0,30}",
    ) {
        let key = normalize(&format!("{prefix}{body}"));
        prop_assert!(!key.as_str().starts_with([' ', '-']));
        prop_assert!(!key.as_str().ends_with([' ', '-']));
        prop_assert!(!key.as_str().contains("  "));
        prop_assert!(key.as_str().chars().all(|c| c.is_alphanumeric() || c == ' ' || c == '-'));
    }
}
