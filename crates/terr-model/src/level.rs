#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// Administrative level of an Italian territory.
///
/// Ordering follows resolution precedence: provinces are tried first, then
/// regions, then macro-regions (ISTAT ripartizioni).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Province,
    Region,
    #[serde(alias = "macro_region", alias = "macro-region")]
    Macro,
}

impl Level {
    /// All levels in resolution precedence order.
    pub const ALL: [Level; 3] = [Level::Province, Level::Region, Level::Macro];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::Region => "region",
            Self::Macro => "macro",
        }
    }

    /// The level directly above this one, if any.
    pub const fn parent(&self) -> Option<Level> {
        match self {
            Self::Province => Some(Self::Region),
            Self::Region => Some(Self::Macro),
            Self::Macro => None,
        }
    }

    /// Levels to search for a given hint, in precedence order.
    pub fn search_order(hint: Option<Level>) -> &'static [Level] {
        match hint {
            None => &Self::ALL,
            Some(Self::Province) => &[Self::Province],
            Some(Self::Region) => &[Self::Region],
            Some(Self::Macro) => &[Self::Macro],
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "province" | "provincia" => Ok(Self::Province),
            "region" | "regione" => Ok(Self::Region),
            "macro" | "macro_region" | "macro-region" | "ripartizione" => Ok(Self::Macro),
            _ => Err(RegistryError::InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!("Province".parse::<Level>().unwrap(), Level::Province);
        assert_eq!("regione".parse::<Level>().unwrap(), Level::Region);
        assert_eq!("macro-region".parse::<Level>().unwrap(), Level::Macro);
        assert!("country".parse::<Level>().is_err());
    }

    #[test]
    fn hierarchy_walks_upwards() {
        assert_eq!(Level::Province.parent(), Some(Level::Region));
        assert_eq!(Level::Region.parent(), Some(Level::Macro));
        assert_eq!(Level::Macro.parent(), None);
    }

    #[test]
    fn search_order_respects_hint() {
        assert_eq!(Level::search_order(None), &Level::ALL);
        assert_eq!(Level::search_order(Some(Level::Region)), &[Level::Region]);
    }
}
