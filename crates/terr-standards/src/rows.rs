//! CSV row layouts for snapshot files.

use std::io::Cursor;

use serde::Deserialize;
use terr_model::{AliasEntry, Level};

use crate::error::{Result, StandardsError};

#[derive(Debug, Clone, Deserialize)]
pub struct MacroRow {
    pub code: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionRow {
    pub code: Option<String>,
    pub name: String,
    pub macro_region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvinceRow {
    pub sigla: Option<String>,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub metropolitan: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AliasRow {
    pub alias: String,
    pub canonical: String,
    pub level: Level,
    #[serde(default)]
    pub ambiguous: bool,
}

impl From<AliasRow> for AliasEntry {
    fn from(row: AliasRow) -> Self {
        Self {
            alias: row.alias,
            canonical: row.canonical,
            level: row.level,
            ambiguous: row.ambiguous,
        }
    }
}

/// Deserialize every row of `content`, naming `file` in errors.
pub fn parse_rows<T>(content: &str, file: &str) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(content.as_bytes()));

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let row = result.map_err(|e| StandardsError::CsvParse {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}
