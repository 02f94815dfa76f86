//! Tidy territory tables.
//!
//! - [`tidy`]: long-format rows and their CSV form
//! - [`reshape`]: wide ISTAT exports into tidy rows
//! - [`standardize`]: attach canonical territories via [`terr_map::Resolver`]
//! - [`coverage`]: which territories report each variable in each year
//! - [`report`]: labels left for manual review

#![deny(unsafe_code)]

pub mod coverage;
pub mod error;
pub mod report;
pub mod reshape;
pub mod standardize;
pub mod tidy;
pub mod value;

pub use coverage::{
    CoverageMatrix, CoverageRow, ExpectedUniverse, FilterColumn, Filters, MissingTerritories,
    compute_coverage, find_gaps, list_missing_territories,
};
pub use error::{CoverageError, TidyError};
pub use report::{ResolutionReport, ReviewRow};
pub use reshape::{HeaderDim, WideLayout, reshape_file, reshape_from};
pub use standardize::{Standardized, StandardizedRecord, read_standardized, standardize};
pub use tidy::{TidyRecord, read_tidy, read_tidy_from, write_csv, write_tidy};
pub use value::{MISSING_MARKERS, parse_value};
