//! Wide to tidy reshaping.
//!
//! ISTAT exports often put territories in rows and spread variables, years,
//! sex and age over one or more header rows:
//!
//! ```text
//! Territorio, Popolazione, ,        Occupati,
//!           , 2021,        2022,    2021,     2022
//! Roma      , 4231451,     4216874, ..,       1801
//! ```
//!
//! Each header row carries one dimension. Blank header cells repeat the value
//! to their left, which is how merged spreadsheet cells come out in CSV.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, TidyError};
use crate::tidy::TidyRecord;
use crate::value::{parse_value, parse_year};

/// Dimension carried by one header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDim {
    Variable,
    Year,
    Sex,
    Age,
}

impl HeaderDim {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Year => "year",
            Self::Sex => "sex",
            Self::Age => "age",
        }
    }
}

impl fmt::Display for HeaderDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderDim {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variable" | "variabile" => Ok(Self::Variable),
            "year" | "anno" => Ok(Self::Year),
            "sex" | "sesso" => Ok(Self::Sex),
            "age" | "eta" | "età" => Ok(Self::Age),
            other => Err(TidyError::layout(format!(
                "unknown header dimension '{other}' (expected variable, year, sex or age)"
            ))),
        }
    }
}

/// Shape of a wide table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideLayout {
    /// One dimension per header row, top to bottom.
    pub header_rows: Vec<HeaderDim>,
    /// Zero-based index of the column holding territory labels.
    pub territory_column: usize,
}

impl WideLayout {
    pub fn new(header_rows: Vec<HeaderDim>, territory_column: usize) -> Result<Self> {
        let layout = Self {
            header_rows,
            territory_column,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Parse a comma-separated dimension list such as `variable,year`.
    pub fn parse(header_rows: &str, territory_column: usize) -> Result<Self> {
        let dims = header_rows
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<HeaderDim>>>()?;
        Self::new(dims, territory_column)
    }

    fn validate(&self) -> Result<()> {
        for dim in [HeaderDim::Variable, HeaderDim::Year] {
            if !self.header_rows.contains(&dim) {
                return Err(TidyError::layout(format!("no header row declared as {dim}")));
            }
        }
        for (i, dim) in self.header_rows.iter().enumerate() {
            if self.header_rows[i + 1..].contains(dim) {
                return Err(TidyError::layout(format!("header dimension {dim} declared twice")));
            }
        }
        Ok(())
    }
}

/// Column header values after forward fill, one per header row.
#[derive(Debug, Clone)]
struct DataColumn {
    index: usize,
    labels: Vec<String>,
}

pub fn reshape_file(path: &Path, layout: &WideLayout) -> Result<Vec<TidyRecord>> {
    let file = std::fs::File::open(path).map_err(|e| TidyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    reshape_from(file, path, layout)
}

/// Reshape a wide CSV into tidy rows, ordered by data row then column.
/// Rows with a blank territory cell are skipped.
pub fn reshape_from<R: io::Read>(
    reader: R,
    path: &Path,
    layout: &WideLayout,
) -> Result<Vec<TidyRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = csv_reader.records();

    let mut header_rows = Vec::with_capacity(layout.header_rows.len());
    for _ in &layout.header_rows {
        let Some(row) = rows.next() else {
            return Err(TidyError::Empty {
                path: path.to_path_buf(),
            });
        };
        let row = row.map_err(|e| TidyError::csv(path, e))?;
        header_rows.push(row.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>());
    }

    let width = header_rows.iter().map(Vec::len).max().unwrap_or(0);
    if layout.territory_column >= width {
        return Err(TidyError::layout(format!(
            "territory column {} is outside a {width}-column header",
            layout.territory_column
        )));
    }
    let columns = data_columns(&header_rows, width, layout.territory_column)?;
    let positions = DimPositions::new(&layout.header_rows);

    let mut years = Vec::with_capacity(columns.len());
    for column in &columns {
        let raw = &column.labels[positions.year];
        let year = parse_year(raw).ok_or_else(|| TidyError::InvalidYear {
            location: format!("header column {}", column.index + 1),
            value: raw.clone(),
        })?;
        years.push(year);
    }

    let mut records = Vec::new();
    let mut data_rows = 0usize;
    for (offset, row) in rows.enumerate() {
        let row = row.map_err(|e| TidyError::csv(path, e))?;
        let line = layout.header_rows.len() + offset + 1;
        let territory = row.get(layout.territory_column).unwrap_or("").trim();
        if territory.is_empty() {
            continue;
        }
        data_rows += 1;
        for (column, &year) in columns.iter().zip(&years) {
            let raw = row.get(column.index).unwrap_or("");
            let value = parse_value(raw).map_err(|value| TidyError::InvalidValue {
                row: line,
                column: column.labels.join(" / "),
                value,
            })?;
            records.push(TidyRecord {
                year,
                territory: territory.to_string(),
                variable: column.labels[positions.variable].clone(),
                sex: positions.sex.map(|i| column.labels[i].clone()),
                age: positions.age.map(|i| column.labels[i].clone()),
                value,
            });
        }
    }

    tracing::info!(
        path = %path.display(),
        columns = columns.len(),
        rows = data_rows,
        records = records.len(),
        "reshaped wide table"
    );
    Ok(records)
}

fn data_columns(header_rows: &[Vec<String>], width: usize, territory: usize) -> Result<Vec<DataColumn>> {
    let mut columns: Vec<DataColumn> = Vec::with_capacity(width.saturating_sub(1));
    for index in (0..width).filter(|&i| i != territory) {
        let mut labels = Vec::with_capacity(header_rows.len());
        for (row_index, row) in header_rows.iter().enumerate() {
            let cell = row.get(index).map(String::as_str).unwrap_or("");
            let label = if cell.is_empty() {
                let Some(previous) = columns.last() else {
                    return Err(TidyError::layout(format!(
                        "header row {} is blank in the first data column",
                        row_index + 1
                    )));
                };
                previous.labels[row_index].clone()
            } else {
                cell.to_string()
            };
            labels.push(label);
        }
        columns.push(DataColumn { index, labels });
    }
    Ok(columns)
}

struct DimPositions {
    variable: usize,
    year: usize,
    sex: Option<usize>,
    age: Option<usize>,
}

impl DimPositions {
    fn new(dims: &[HeaderDim]) -> Self {
        let find = |dim: HeaderDim| dims.iter().position(|d| *d == dim);
        Self {
            // Presence of both is checked by `WideLayout::validate`.
            variable: find(HeaderDim::Variable).unwrap_or(0),
            year: find(HeaderDim::Year).unwrap_or(0),
            sex: find(HeaderDim::Sex),
            age: find(HeaderDim::Age),
        }
    }
}
