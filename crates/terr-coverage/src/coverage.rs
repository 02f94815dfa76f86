//! Variable × year coverage of standardized territory data.
//!
//! A territory is *present* for a `(variable, year)` when at least one of its
//! rows carries a value. Coverage is `present / expected`, where the expected
//! universe is either every territory seen in the filtered data or only those
//! seen in the same year.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use terr_model::Level;

use crate::error::CoverageError;
use crate::standardize::StandardizedRecord;

type Result<T> = std::result::Result<T, CoverageError>;

/// Which territories count as expected for a `(variable, year)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedUniverse {
    /// Every territory in the filtered data, any year.
    #[default]
    All,
    /// Territories with any row in that year.
    ByYear,
}

impl FromStr for ExpectedUniverse {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "by_year" => Ok(Self::ByYear),
            _ => Err(CoverageError::UnknownUniverse(s.to_string())),
        }
    }
}

/// Columns that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterColumn {
    Sex,
    Age,
    Variable,
}

impl FilterColumn {
    fn value<'a>(&self, record: &'a StandardizedRecord) -> Option<&'a str> {
        match self {
            Self::Sex => record.sex.as_deref(),
            Self::Age => record.age.as_deref(),
            Self::Variable => Some(record.variable.as_str()),
        }
    }
}

impl FromStr for FilterColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sex" => Ok(Self::Sex),
            "age" => Ok(Self::Age),
            "variable" => Ok(Self::Variable),
            other => Err(format!("unknown column '{other}' (expected sex, age or variable)")),
        }
    }
}

/// Row filters: for each column, the values a row may have.
/// `None` among the allowed values admits rows where the column is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    allowed: BTreeMap<FilterColumn, BTreeSet<Option<String>>>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow<I, S>(mut self, column: FilterColumn, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.allowed
            .entry(column)
            .or_default()
            .extend(values.into_iter().map(|v| v.map(Into::into)));
        self
    }

    /// Add a `column=v1,v2` clause. An empty value (`sex=Totale,`) admits
    /// blank cells.
    pub fn add_clause(&mut self, clause: &str) -> Result<()> {
        let invalid = |message: String| CoverageError::InvalidFilter {
            clause: clause.to_string(),
            message,
        };
        let Some((column, values)) = clause.split_once('=') else {
            return Err(invalid("expected column=value[,value...]".to_string()));
        };
        let column: FilterColumn = column.parse().map_err(invalid)?;
        let values = values.split(',').map(|v| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        });
        self.allowed.entry(column).or_default().extend(values);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn admits(&self, record: &StandardizedRecord) -> bool {
        self.allowed.iter().all(|(column, allowed)| {
            let value = column.value(record).map(str::trim).filter(|v| !v.is_empty());
            allowed.iter().any(|a| a.as_deref() == value)
        })
    }
}

/// Coverage of one `(variable, year)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub level: Level,
    pub variable: String,
    pub year: i32,
    pub present_count: usize,
    pub expected_count: usize,
    pub missing_count: usize,
    /// `None` when nothing was expected.
    pub coverage: Option<f64>,
}

/// Rows at `level` that pass the filters, with their territory.
fn scoped<'a>(
    records: &'a [StandardizedRecord],
    level: Level,
    filters: &'a Filters,
) -> Result<impl Iterator<Item = (&'a StandardizedRecord, &'a str)>> {
    if level == Level::Macro {
        return Err(CoverageError::UnsupportedLevel(level));
    }
    Ok(records
        .iter()
        .filter(move |r| r.level == Some(level) && filters.admits(r))
        .filter_map(move |r| r.territory_at(level).map(|t| (r, t))))
}

pub fn compute_coverage(
    records: &[StandardizedRecord],
    level: Level,
    filters: &Filters,
    expected: ExpectedUniverse,
) -> Result<Vec<CoverageRow>> {
    let mut universe: BTreeSet<&str> = BTreeSet::new();
    let mut by_year: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
    let mut observed: BTreeMap<(&str, i32), BTreeSet<&str>> = BTreeMap::new();
    let mut present: BTreeMap<(&str, i32), BTreeSet<&str>> = BTreeMap::new();

    for (record, territory) in scoped(records, level, filters)? {
        universe.insert(territory);
        by_year.entry(record.year).or_default().insert(territory);
        let key = (record.variable.as_str(), record.year);
        observed.entry(key).or_default();
        if record.value.is_some() {
            present.entry(key).or_default().insert(territory);
        }
    }

    let rows: Vec<CoverageRow> = observed
        .into_keys()
        .map(|(variable, year)| {
            let present_count = present.get(&(variable, year)).map_or(0, BTreeSet::len);
            let expected_count = match expected {
                ExpectedUniverse::All => universe.len(),
                ExpectedUniverse::ByYear => by_year.get(&year).map_or(0, BTreeSet::len),
            };
            let coverage = (expected_count > 0)
                .then(|| (present_count as f64 / expected_count as f64).clamp(0.0, 1.0));
            CoverageRow {
                level,
                variable: variable.to_string(),
                year,
                present_count,
                expected_count,
                missing_count: expected_count.saturating_sub(present_count),
                coverage,
            }
        })
        .collect();

    tracing::debug!(%level, rows = rows.len(), territories = universe.len(), "computed coverage");
    Ok(rows)
}

/// Rows whose coverage is below `threshold`. Rows with no coverage figure
/// are not gaps.
pub fn find_gaps(rows: &[CoverageRow], threshold: f64) -> Vec<CoverageRow> {
    rows.iter()
        .filter(|row| row.coverage.is_some_and(|c| c < threshold))
        .cloned()
        .collect()
}

/// Territories expected but without a value for one `(variable, year)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingTerritories {
    pub variable: String,
    pub year: i32,
    pub level: Level,
    /// Sorted.
    pub missing: Vec<String>,
}

pub fn list_missing_territories(
    records: &[StandardizedRecord],
    variable: &str,
    year: i32,
    level: Level,
    filters: &Filters,
    expected: ExpectedUniverse,
) -> Result<MissingTerritories> {
    let mut universe: BTreeSet<&str> = BTreeSet::new();
    let mut present: BTreeSet<&str> = BTreeSet::new();

    for (record, territory) in scoped(records, level, filters)? {
        if expected == ExpectedUniverse::All || record.year == year {
            universe.insert(territory);
        }
        if record.variable == variable && record.year == year && record.value.is_some() {
            present.insert(territory);
        }
    }

    Ok(MissingTerritories {
        variable: variable.to_string(),
        year,
        level,
        missing: universe
            .difference(&present)
            .map(|t| (*t).to_string())
            .collect(),
    })
}

/// Coverage arranged as a variables × years grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageMatrix {
    pub level: Level,
    pub title: Option<String>,
    /// Sorted.
    pub variables: Vec<String>,
    /// Sorted ascending.
    pub years: Vec<i32>,
    /// `cells[v][y]`; `None` where the pair has no row or no figure.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CoverageMatrix {
    /// Pivot coverage rows, optionally keeping only some variables.
    pub fn from_rows(rows: &[CoverageRow], level: Level, variables: Option<&[String]>) -> Result<Self> {
        let kept: Vec<&CoverageRow> = rows
            .iter()
            .filter(|row| variables.is_none_or(|vs| vs.contains(&row.variable)))
            .collect();
        if kept.is_empty() {
            return Err(CoverageError::NoData);
        }

        let variables: Vec<String> = kept
            .iter()
            .map(|row| row.variable.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let years: Vec<i32> = kept
            .iter()
            .map(|row| row.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![None; years.len()]; variables.len()];
        for row in kept {
            if let (Ok(v), Ok(y)) = (
                variables.binary_search(&row.variable),
                years.binary_search(&row.year),
            ) {
                cells[v][y] = row.coverage;
            }
        }
        Ok(Self {
            level,
            title: None,
            variables,
            years,
            cells,
        })
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Coverage by variable × year ({})", self.level))
    }

    pub fn get(&self, variable: &str, year: i32) -> Option<f64> {
        let v = self.variables.iter().position(|name| name == variable)?;
        let y = self.years.binary_search(&year).ok()?;
        self.cells[v][y]
    }
}

impl fmt::Display for ExpectedUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::ByYear => "by-year",
        })
    }
}

#[cfg(test)]
mod tests {
    use terr_model::MatchMethod;

    use super::*;

    fn row(province: Option<&str>, variable: &str, year: i32, value: Option<f64>) -> StandardizedRecord {
        StandardizedRecord {
            year,
            territory: province.unwrap_or("???").to_string(),
            variable: variable.to_string(),
            sex: None,
            age: None,
            value,
            province_std: province.map(str::to_string),
            region_std: province.map(|_| "Sardegna".to_string()),
            macro_std: province.map(|_| "Isole".to_string()),
            level: province.map(|_| Level::Province),
            match_method: if province.is_some() {
                MatchMethod::Exact
            } else {
                MatchMethod::Unresolved
            },
            confidence: if province.is_some() { 1.0 } else { 0.0 },
        }
    }

    fn sample() -> Vec<StandardizedRecord> {
        vec![
            row(Some("Nuoro"), "pop", 2020, Some(1.0)),
            row(Some("Sassari"), "pop", 2020, None),
            row(Some("Cagliari"), "pop", 2020, Some(3.0)),
            row(Some("Nuoro"), "pop", 2021, Some(1.0)),
            row(Some("Nuoro"), "gdp", 2021, Some(9.0)),
            row(None, "pop", 2021, Some(5.0)),
        ]
    }

    #[test]
    fn coverage_against_all_territories() {
        let rows = compute_coverage(&sample(), Level::Province, &Filters::new(), ExpectedUniverse::All).unwrap();
        let keys: Vec<(&str, i32)> = rows.iter().map(|r| (r.variable.as_str(), r.year)).collect();
        assert_eq!(keys, vec![("gdp", 2021), ("pop", 2020), ("pop", 2021)]);

        let pop_2020 = &rows[1];
        assert_eq!(pop_2020.present_count, 2);
        assert_eq!(pop_2020.expected_count, 3);
        assert_eq!(pop_2020.missing_count, 1);
        assert!((pop_2020.coverage.unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn coverage_by_year_uses_that_years_territories() {
        let rows = compute_coverage(&sample(), Level::Province, &Filters::new(), ExpectedUniverse::ByYear).unwrap();
        let pop_2021 = rows.iter().find(|r| r.variable == "pop" && r.year == 2021).unwrap();
        assert_eq!(pop_2021.expected_count, 1);
        assert_eq!(pop_2021.coverage, Some(1.0));
    }

    #[test]
    fn region_level_ignores_province_rows() {
        let rows = compute_coverage(&sample(), Level::Region, &Filters::new(), ExpectedUniverse::All).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn macro_level_is_rejected() {
        let err = compute_coverage(&sample(), Level::Macro, &Filters::new(), ExpectedUniverse::All).unwrap_err();
        assert!(matches!(err, CoverageError::UnsupportedLevel(Level::Macro)));
    }

    #[test]
    fn gaps_below_threshold() {
        let rows = compute_coverage(&sample(), Level::Province, &Filters::new(), ExpectedUniverse::All).unwrap();
        let gaps = find_gaps(&rows, 1.0);
        assert_eq!(gaps.len(), 3);
        assert!(find_gaps(&rows, 0.3).is_empty());
    }

    #[test]
    fn missing_list_is_sorted() {
        let missing =
            list_missing_territories(&sample(), "pop", 2021, Level::Province, &Filters::new(), ExpectedUniverse::All)
                .unwrap();
        assert_eq!(missing.missing, vec!["Cagliari".to_string(), "Sassari".to_string()]);

        let by_year = list_missing_territories(
            &sample(),
            "pop",
            2021,
            Level::Province,
            &Filters::new(),
            ExpectedUniverse::ByYear,
        )
        .unwrap();
        assert!(by_year.missing.is_empty());
    }

    #[test]
    fn filters_admit_blank_cells_when_asked() {
        let mut records = sample();
        records[0].sex = Some("Totale".to_string());
        records[2].sex = Some("Maschi".to_string());

        let mut filters = Filters::new();
        filters.add_clause("sex=Totale,").unwrap();
        assert!(filters.admits(&records[0]));
        assert!(filters.admits(&records[1]));
        assert!(!filters.admits(&records[2]));

        let strict = Filters::new().allow(FilterColumn::Sex, [Some("Totale")]);
        assert!(!strict.admits(&records[1]));
    }

    #[test]
    fn bad_filter_clauses() {
        let mut filters = Filters::new();
        assert!(filters.add_clause("sex").is_err());
        assert!(filters.add_clause("colour=red").is_err());
        assert!(filters.is_empty());
    }

    #[test]
    fn matrix_pivots_rows() {
        let rows = compute_coverage(&sample(), Level::Province, &Filters::new(), ExpectedUniverse::All).unwrap();
        let matrix = CoverageMatrix::from_rows(&rows, Level::Province, None).unwrap();
        assert_eq!(matrix.variables, vec!["gdp".to_string(), "pop".to_string()]);
        assert_eq!(matrix.years, vec![2020, 2021]);
        assert_eq!(matrix.get("gdp", 2020), None);
        assert!((matrix.get("pop", 2021).unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(matrix.title(), "Coverage by variable × year (province)");

        let only = vec!["nothing".to_string()];
        assert!(matches!(
            CoverageMatrix::from_rows(&rows, Level::Province, Some(&only)),
            Err(CoverageError::NoData)
        ));
    }

    #[test]
    fn universe_names_parse() {
        assert_eq!("by-year".parse::<ExpectedUniverse>().unwrap(), ExpectedUniverse::ByYear);
        assert!("sometimes".parse::<ExpectedUniverse>().is_err());
    }
}
