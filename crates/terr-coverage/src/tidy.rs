//! Tidy (long) territory tables.
//!
//! One row per observation: `year, territory, variable, sex, age, value`.
//! `sex`, `age` and `value` may be blank. Values use the same missing-marker
//! rules as wide tables.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::value::{parse_value, parse_year};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    pub year: i32,
    pub territory: String,
    pub variable: String,
    pub sex: Option<String>,
    pub age: Option<String>,
    pub value: Option<f64>,
}

impl TidyRecord {
    pub fn new(year: i32, territory: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            year,
            territory: territory.into(),
            variable: variable.into(),
            sex: None,
            age: None,
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }
}

/// Row as it sits in the file, before value parsing.
#[derive(Debug, Deserialize)]
struct RawTidyRow {
    year: String,
    territory: String,
    variable: String,
    #[serde(default)]
    sex: Option<String>,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

pub fn read_tidy(path: &Path) -> Result<Vec<TidyRecord>> {
    let file = std::fs::File::open(path).map_err(|e| TidyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let records = read_tidy_from(file, path)?;
    tracing::debug!(path = %path.display(), rows = records.len(), "read tidy table");
    Ok(records)
}

/// Read tidy rows from any reader; `path` is only used in error messages.
pub fn read_tidy_from<R: io::Read>(reader: R, path: &Path) -> Result<Vec<TidyRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<RawTidyRow>().enumerate() {
        let row = row.map_err(|e| TidyError::csv(path, e))?;
        let line = index + 2;
        let year = parse_year(&row.year).ok_or_else(|| TidyError::InvalidYear {
            location: format!("row {line}"),
            value: row.year.clone(),
        })?;
        let value = match row.value.as_deref() {
            Some(raw) => parse_value(raw).map_err(|value| TidyError::InvalidValue {
                row: line,
                column: "value".to_string(),
                value,
            })?,
            None => None,
        };
        records.push(TidyRecord {
            year,
            territory: row.territory,
            variable: row.variable,
            sex: non_blank(row.sex),
            age: non_blank(row.age),
            value,
        });
    }
    Ok(records)
}

/// Write any serializable rows as a headed CSV file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| TidyError::csv(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| TidyError::csv(path, e))?;
    }
    writer.flush().map_err(|e| TidyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

pub fn write_tidy(path: &Path, records: &[TidyRecord]) -> Result<()> {
    write_csv(path, records)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
year,territory,variable,sex,age,value
2021,Roma,pop,Totale,,4231451
2021,Milano,pop,,,..
2022.0,Bergamo,pop,Maschi,0-14,12.5
";

    #[test]
    fn reads_blanks_and_markers_as_none() {
        let records = read_tidy_from(SAMPLE.as_bytes(), Path::new("sample.csv")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, Some(4_231_451.0));
        assert_eq!(records[0].sex.as_deref(), Some("Totale"));
        assert!(records[0].age.is_none());
        assert!(records[1].value.is_none());
        assert!(records[1].sex.is_none());
        assert_eq!(records[2].year, 2022);
        assert_eq!(records[2].age.as_deref(), Some("0-14"));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "year,territory,variable\n2020,Lazio,gdp\n";
        let records = read_tidy_from(csv.as_bytes(), Path::new("short.csv")).unwrap();
        assert_eq!(records, vec![TidyRecord::new(2020, "Lazio", "gdp")]);
    }

    #[test]
    fn bad_value_reports_row() {
        let csv = "year,territory,variable,value\n2020,Lazio,gdp,1\n2020,Lazio,gdp,lots\n";
        let err = read_tidy_from(csv.as_bytes(), Path::new("bad.csv")).unwrap_err();
        match err {
            TidyError::InvalidValue { row, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_year_is_rejected() {
        let csv = "year,territory,variable\nanno,Lazio,gdp\n";
        assert!(matches!(
            read_tidy_from(csv.as_bytes(), Path::new("bad.csv")),
            Err(TidyError::InvalidYear { .. })
        ));
    }

    #[test]
    fn write_then_read_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tidy.csv");
        let records = vec![
            TidyRecord::new(2021, "Roma", "pop").with_value(1.5).with_sex("Totale"),
            TidyRecord::new(2021, "Milano", "pop").with_age("65+"),
        ];
        write_tidy(&path, &records).unwrap();
        assert_eq!(read_tidy(&path).unwrap(), records);
    }
}
