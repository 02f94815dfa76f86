//! Deterministic text canonicalization for territory labels.
//!
//! [`normalize`] turns a raw label into a [`NormalizedKey`]: lower-case,
//! diacritics removed, administrative prefixes ("provincia di",
//! "città metropolitana di", "regione", ...) dropped, punctuation folded to
//! single spaces with internal hyphens preserved.
//!
//! The key is a lookup device only. It is never used as a territory's
//! identity.

use std::fmt;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Administrative prefixes removed from the start of a label.
///
/// Longer forms come before their shorter stems.
pub const STOPWORD_PREFIXES: &[&str] = &[
    "provincia autonoma di",
    "provincia di",
    "prov di",
    "citta metropolitana di",
    "libero consorzio comunale di",
    "regione autonoma",
    "regione",
    "ripartizione",
];

const MAX_PASSES: usize = 8;

/// Lookup key derived from a raw label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw territory label.
///
/// Total: every input, including the empty string, yields a key (possibly
/// empty). Idempotent: `normalize(normalize(x).as_str()) == normalize(x)`.
pub fn normalize(text: &str) -> NormalizedKey {
    let mut current = single_pass(text);
    for _ in 1..MAX_PASSES {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    NormalizedKey(current)
}

fn single_pass(text: &str) -> String {
    let folded = fold_case_and_marks(text);
    let separated = collapse_separators(&folded);
    strip_prefixes(&separated).to_string()
}

fn fold_case_and_marks(text: &str) -> String {
    let stripped: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

fn is_hyphen(c: char) -> bool {
    matches!(
        c,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}'
    )
}

/// Folds punctuation and whitespace runs into one separator: `-` when the run
/// holds a hyphen, a space otherwise. Leading and trailing separators go.
fn collapse_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if let Some(sep) = pending.take()
                && !out.is_empty()
            {
                out.push(sep);
            }
            out.push(c);
        } else if is_hyphen(c) {
            pending = Some('-');
        } else if pending.is_none() {
            pending = Some(' ');
        }
    }
    out
}

fn strip_prefixes(mut text: &str) -> &str {
    'outer: loop {
        for prefix in STOPWORD_PREFIXES {
            if let Some(rest) = text.strip_prefix(prefix)
                && let Some(rest) = rest.strip_prefix([' ', '-'])
                && !rest.is_empty()
            {
                text = rest;
                continue 'outer;
            }
        }
        return text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> String {
        normalize(text).into_string()
    }

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(key("Forlì"), "forli");
        assert_eq!(key("  VALLÉE   d'Aoste "), "vallee d aoste");
        assert_eq!(key("Trentino-Alto Adige/Südtirol"), "trentino-alto adige sudtirol");
    }

    #[test]
    fn removes_administrative_prefixes() {
        assert_eq!(key("Provincia di Forlì-Cesena"), "forli-cesena");
        assert_eq!(key("Città Metropolitana di Roma Capitale"), "roma capitale");
        assert_eq!(key("Prov. di Bergamo"), "bergamo");
        assert_eq!(key("Regione Autonoma Valle d'Aosta"), "valle d aosta");
        assert_eq!(key("Provincia Autonoma di Trento"), "trento");
    }

    #[test]
    fn keeps_prefix_word_when_nothing_follows() {
        assert_eq!(key("Regione"), "regione");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(key("Barletta - Andria -- Trani"), "barletta-andria-trani");
        assert_eq!(key("Massa–Carrara"), "massa-carrara");
        assert_eq!(key("-Pesaro e Urbino-"), "pesaro e urbino");
        assert_eq!(key("B.A.T."), "b a t");
    }

    #[test]
    fn empty_and_punctuation_only_inputs() {
        assert_eq!(key(""), "");
        assert_eq!(key("  "), "");
        assert_eq!(key("--'./"), "");
    }

    #[test]
    fn prefix_exposed_by_punctuation_is_stripped() {
        assert_eq!(key("'Provincia di' Lecce"), "lecce");
    }
}
