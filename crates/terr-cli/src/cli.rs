//! CLI argument definitions for `territori`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use terr_coverage::ExpectedUniverse;
use terr_map::SimilarityMetric;
use terr_model::Level;

#[derive(Parser)]
#[command(
    name = "territori",
    version,
    about = "Standardize Italian territory names (provinces, regions, macro-regions)",
    long_about = "Map messy Italian territory labels to canonical ISTAT names.\n\n\
                  Labels are matched exactly, through curated aliases, after \
                  normalization, and finally by fuzzy similarity. Every match \
                  is backfilled with its region and macro-region."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Reference snapshot directory (default: $TERRITORI_REFERENCE_DIR, then
    /// the embedded ISTAT snapshot).
    #[arg(long = "reference-dir", value_name = "DIR", global = true)]
    pub reference_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve territory labels given on the command line or in a CSV column.
    Resolve(ResolveArgs),

    /// Add canonical territory columns to a tidy CSV.
    Standardize(StandardizeArgs),

    /// Turn a wide CSV (years/variables across columns) into a tidy CSV.
    Reshape(ReshapeArgs),

    /// Report which territories have data for each variable and year.
    Coverage(CoverageArgs),

    /// Inspect the reference snapshot.
    #[command(subcommand)]
    Registry(RegistryCommand),
}

/// Fuzzy matching controls shared by commands that resolve labels.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Resolver configuration file (TOML, `[fuzzy]` table).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start from a named policy before applying other flags.
    #[arg(long = "preset", value_enum)]
    pub preset: Option<PresetArg>,

    /// Minimum similarity for a fuzzy match to be accepted.
    #[arg(long = "threshold", value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Minimum lead over the runner-up; closer candidates are ambiguous.
    #[arg(long = "margin", value_name = "SCORE")]
    pub margin: Option<f64>,

    /// Similarity metric for fuzzy matching.
    #[arg(long = "metric", value_enum)]
    pub metric: Option<MetricArg>,

    /// Disable fuzzy matching entirely.
    #[arg(long = "no-fuzzy")]
    pub no_fuzzy: bool,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Labels to resolve.
    #[arg(value_name = "LABEL")]
    pub labels: Vec<String>,

    /// Read labels from a CSV file.
    #[arg(long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Column holding labels in --input.
    #[arg(long = "column", value_name = "NAME", default_value = "territory")]
    pub column: String,

    /// Only consider this administrative level.
    #[arg(long = "level", value_enum)]
    pub level: Option<LevelArg>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Exit with status 2 when any label is unresolved or ambiguous.
    #[arg(long = "fail-on-unresolved")]
    pub fail_on_unresolved: bool,
}

#[derive(Parser)]
pub struct StandardizeArgs {
    /// Tidy CSV with year, territory, variable, sex, age, value columns.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the standardized CSV.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Only consider this administrative level.
    #[arg(long = "level", value_enum)]
    pub level: Option<LevelArg>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Write labels needing review here (.json for JSON, otherwise CSV).
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Exit with status 2 when any label is unresolved or ambiguous.
    #[arg(long = "fail-on-unresolved")]
    pub fail_on_unresolved: bool,
}

#[derive(Parser)]
pub struct ReshapeArgs {
    /// Wide CSV export.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the tidy CSV.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Dimension of each header row, top to bottom (variable, year, sex, age).
    #[arg(long = "header-rows", value_name = "DIMS", default_value = "variable,year")]
    pub header_rows: String,

    /// Zero-based index of the territory column.
    #[arg(long = "territory-column", value_name = "N", default_value_t = 0)]
    pub territory_column: usize,
}

#[derive(Parser)]
pub struct CoverageArgs {
    /// Standardized CSV produced by `territori standardize`.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Territorial level to measure.
    #[arg(long = "level", value_enum, default_value = "province")]
    pub level: CoverageLevelArg,

    /// Which territories count as expected.
    #[arg(long = "expected", value_enum, default_value = "all")]
    pub expected: ExpectedArg,

    /// Row filter `column=v1,v2` over sex, age or variable (repeatable).
    /// A trailing comma also admits blank cells.
    #[arg(long = "filter", value_name = "COL=VALUES")]
    pub filters: Vec<String>,

    /// Only show rows with coverage below this value.
    #[arg(long = "gaps", value_name = "THRESHOLD", num_args = 0..=1, default_missing_value = "1.0")]
    pub gaps: Option<f64>,

    /// List territories missing for one variable and year (`VARIABLE:YEAR`).
    #[arg(long = "missing", value_name = "VARIABLE:YEAR")]
    pub missing: Option<String>,

    /// Print a variables × years coverage grid.
    #[arg(long = "heatmap")]
    pub heatmap: bool,

    /// Restrict the heatmap to these variables (repeatable).
    #[arg(long = "variable", value_name = "NAME")]
    pub variables: Vec<String>,

    /// Heatmap title.
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Also write the coverage rows to this CSV file.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for the coverage rows.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Subcommand)]
pub enum RegistryCommand {
    /// List canonical territories.
    List {
        /// Only list this level.
        #[arg(long = "level", value_enum)]
        level: Option<LevelArg>,
    },

    /// Show the aliases of one canonical territory.
    Aliases {
        /// Canonical name, exactly as listed.
        #[arg(value_name = "CANONICAL")]
        canonical: String,

        #[arg(long = "level", value_enum, default_value = "province")]
        level: LevelArg,
    },

    /// Verify the snapshot and print its provenance.
    Doctor {
        /// Print the report as JSON.
        #[arg(long = "json")]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Province,
    Region,
    #[value(alias = "macro-region")]
    Macro,
}

impl From<LevelArg> for Level {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Province => Level::Province,
            LevelArg::Region => Level::Region,
            LevelArg::Macro => Level::Macro,
        }
    }
}

/// Coverage is only defined below the macro-region level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CoverageLevelArg {
    Province,
    Region,
}

impl From<CoverageLevelArg> for Level {
    fn from(value: CoverageLevelArg) -> Self {
        match value {
            CoverageLevelArg::Province => Level::Province,
            CoverageLevelArg::Region => Level::Region,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExpectedArg {
    All,
    ByYear,
}

impl From<ExpectedArg> for ExpectedUniverse {
    fn from(value: ExpectedArg) -> Self {
        match value {
            ExpectedArg::All => ExpectedUniverse::All,
            ExpectedArg::ByYear => ExpectedUniverse::ByYear,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Indel,
    JaroWinkler,
    Levenshtein,
}

impl From<MetricArg> for SimilarityMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Indel => SimilarityMetric::Indel,
            MetricArg::JaroWinkler => SimilarityMetric::JaroWinkler,
            MetricArg::Levenshtein => SimilarityMetric::Levenshtein,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    Default,
    Strict,
    Relaxed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
