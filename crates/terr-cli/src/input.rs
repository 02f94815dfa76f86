//! Reading label columns from CSV files.

use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Read one named column from a headed CSV file. Blank cells are kept so
/// output rows line up with input rows.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_column_from(file, column).with_context(|| format!("read {}", path.display()))
}

pub fn read_column_from<R: io::Read>(reader: R, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().context("read CSV header")?.clone();
    let Some(index) = headers.iter().position(|h| h.trim() == column) else {
        let available: Vec<&str> = headers.iter().collect();
        bail!(
            "column '{column}' not found (available: {})",
            available.join(", ")
        );
    };

    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record.context("read CSV row")?;
        labels.push(record.get(index).unwrap_or("").to_string());
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_column() {
        let csv = "id,territory\n1,Roma\n2,\n3,Provincia di Forlì-Cesena\n";
        let labels = read_column_from(csv.as_bytes(), "territory").unwrap();
        assert_eq!(labels, vec!["Roma", "", "Provincia di Forlì-Cesena"]);
    }

    #[test]
    fn missing_column_lists_available() {
        let err = read_column_from("a,b\n1,2\n".as_bytes(), "territory").unwrap_err();
        assert!(err.to_string().contains("available: a, b"));
    }
}
