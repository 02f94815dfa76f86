//! Subcommand implementations.

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use terr_coverage::{
    CoverageMatrix, Filters, ResolutionReport, WideLayout, compute_coverage, find_gaps,
    list_missing_territories, read_standardized, read_tidy, reshape_file, standardize, write_csv,
    write_tidy,
};
use terr_map::{FuzzyPolicy, ResolutionSummary, Resolver, ResolverConfig};
use terr_model::{CanonicalName, Level, ResolutionResult};
use terr_standards::{DoctorReport, LoadedReference, load_reference};
use tracing::{info, info_span};

use crate::cli::{
    CoverageArgs, OutputFormatArg, PolicyArgs, PresetArg, RegistryCommand, ReshapeArgs,
    ResolveArgs, StandardizeArgs,
};
use crate::input::read_column;
use crate::summary::{
    coverage_table, doctor_table, heatmap_table, missing_table, registry_table,
    resolution_summary_table, results_table,
};

/// How a successful command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Some labels were unresolved or ambiguous and the caller asked to fail on that.
    NeedsReview,
}

impl Outcome {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NeedsReview => 2,
        }
    }

    fn from_review(fail_on_unresolved: bool, needs_review: bool) -> Self {
        if fail_on_unresolved && needs_review {
            Self::NeedsReview
        } else {
            Self::Success
        }
    }
}

pub fn load_snapshot(reference_dir: Option<&Path>) -> Result<LoadedReference> {
    let loaded = load_reference(reference_dir).context("load reference snapshot")?;
    info!(
        source = %loaded.source.describe(),
        snapshot = loaded.data.snapshot(),
        "reference snapshot loaded"
    );
    Ok(loaded)
}

/// Combine config file, preset and flags into one policy. Flags win over the
/// preset, and the preset wins over the file.
pub fn build_policy(args: &PolicyArgs) -> Result<FuzzyPolicy> {
    let mut policy = match &args.config {
        Some(path) => ResolverConfig::load(path)?.fuzzy,
        None => FuzzyPolicy::default(),
    };
    if let Some(preset) = args.preset {
        let enabled = policy.enabled;
        policy = match preset {
            PresetArg::Default => FuzzyPolicy::default(),
            PresetArg::Strict => FuzzyPolicy::strict(),
            PresetArg::Relaxed => FuzzyPolicy::relaxed(),
        };
        policy.enabled = enabled;
    }
    if let Some(threshold) = args.threshold {
        policy.threshold = threshold;
    }
    if let Some(margin) = args.margin {
        policy.margin = margin;
    }
    if let Some(metric) = args.metric {
        policy.metric = metric.into();
    }
    if args.no_fuzzy {
        policy.enabled = false;
    }
    policy.validate()?;
    Ok(policy)
}

fn build_resolver(reference_dir: Option<&Path>, policy: &PolicyArgs) -> Result<Resolver> {
    let policy = build_policy(policy)?;
    let loaded = load_snapshot(reference_dir)?;
    Ok(Resolver::new(Arc::new(loaded.data), policy)?)
}

pub fn run_resolve(args: &ResolveArgs, reference_dir: Option<&Path>) -> Result<Outcome> {
    let mut labels = args.labels.clone();
    if let Some(path) = &args.input {
        labels.extend(read_column(path, &args.column)?);
    }
    if labels.is_empty() {
        bail!("no labels given (pass LABEL arguments or --input FILE)");
    }

    let resolver = build_resolver(reference_dir, &args.policy)?;
    let hint = args.level.map(Level::from);
    let results = resolver.resolve_all(&labels, hint);
    let summary = ResolutionSummary::from_results(&results);

    let stdout = io::stdout();
    match args.format {
        OutputFormatArg::Table => {
            println!("{}", results_table(&results));
            println!("{}", resolution_summary_table(&summary));
        }
        OutputFormatArg::Csv => write_result_rows(stdout.lock(), &results)?,
        OutputFormatArg::Json => {
            serde_json::to_writer_pretty(stdout.lock(), &results)?;
            println!();
        }
    }
    Ok(Outcome::from_review(
        args.fail_on_unresolved,
        summary.needs_review() > 0,
    ))
}

pub fn run_standardize(args: &StandardizeArgs, reference_dir: Option<&Path>) -> Result<Outcome> {
    let span = info_span!("standardize", input = %args.input.display());
    let _guard = span.enter();

    let resolver = build_resolver(reference_dir, &args.policy)?;
    let records = read_tidy(&args.input)?;
    let standardized = standardize(&records, &resolver, args.level.map(Level::from));
    write_csv(&args.output, &standardized.records)
        .with_context(|| format!("write {}", args.output.display()))?;

    let report = ResolutionReport::from_results(&standardized.resolutions);
    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    println!(
        "Standardized {} rows ({} distinct labels) -> {}",
        standardized.records.len(),
        standardized.resolutions.len(),
        args.output.display()
    );
    println!("{}", resolution_summary_table(&report.summary));
    if !report.is_clean() {
        eprintln!("{} label(s) need review", report.review.len());
    }
    Ok(Outcome::from_review(args.fail_on_unresolved, !report.is_clean()))
}

fn write_report(path: &Path, report: &ResolutionReport) -> Result<()> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let file = std::fs::File::create(path)
            .with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer_pretty(file, report)?;
    } else {
        report.write_review_csv(path)?;
    }
    info!(path = %path.display(), review = report.review.len(), "wrote review report");
    Ok(())
}

pub fn run_reshape(args: &ReshapeArgs) -> Result<Outcome> {
    let layout = WideLayout::parse(&args.header_rows, args.territory_column)?;
    let records = reshape_file(&args.input, &layout)?;
    write_tidy(&args.output, &records)?;
    println!(
        "Reshaped {} -> {} ({} rows)",
        args.input.display(),
        args.output.display(),
        records.len()
    );
    Ok(Outcome::Success)
}

pub fn run_coverage(args: &CoverageArgs) -> Result<Outcome> {
    let level = Level::from(args.level);
    let expected = args.expected.into();
    let mut filters = Filters::new();
    for clause in &args.filters {
        filters.add_clause(clause)?;
    }

    let records = read_standardized(&args.input)?;
    let all_rows = compute_coverage(&records, level, &filters, expected)?;
    let rows = match args.gaps {
        Some(threshold) => find_gaps(&all_rows, threshold),
        None => all_rows.clone(),
    };

    if let Some(path) = &args.output {
        write_csv(path, &rows)?;
    }
    let stdout = io::stdout();
    match args.format {
        OutputFormatArg::Table => println!("{}", coverage_table(&rows)),
        OutputFormatArg::Csv => {
            let mut writer = csv::Writer::from_writer(stdout.lock());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormatArg::Json => {
            serde_json::to_writer_pretty(stdout.lock(), &rows)?;
            println!();
        }
    }

    if let Some(target) = &args.missing {
        let (variable, year) = parse_missing_target(target)?;
        let missing =
            list_missing_territories(&records, variable, year, level, &filters, expected)?;
        println!("{}", missing_table(&missing));
    }

    if args.heatmap {
        let variables = (!args.variables.is_empty()).then_some(args.variables.as_slice());
        let mut matrix = CoverageMatrix::from_rows(&all_rows, level, variables)?;
        if let Some(title) = &args.title {
            matrix = matrix.with_title(title);
        }
        println!("{}", matrix.title());
        println!("{}", heatmap_table(&matrix));
    }
    Ok(Outcome::Success)
}

/// Split `VARIABLE:YEAR`. The variable may itself contain colons.
pub fn parse_missing_target(raw: &str) -> Result<(&str, i32)> {
    let (variable, year) = raw
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected VARIABLE:YEAR, got '{raw}'"))?;
    let year = year
        .trim()
        .parse::<i32>()
        .with_context(|| format!("invalid year in '{raw}'"))?;
    let variable = variable.trim();
    if variable.is_empty() {
        bail!("empty variable in '{raw}'");
    }
    Ok((variable, year))
}

pub fn run_registry(command: &RegistryCommand, reference_dir: Option<&Path>) -> Result<Outcome> {
    let loaded = load_snapshot(reference_dir)?;
    match command {
        RegistryCommand::List { level } => {
            let level = level.map(Level::from);
            println!("{}", registry_table(&loaded.data.registry, level));
        }
        RegistryCommand::Aliases { canonical, level } => {
            let level = Level::from(*level);
            let registry = &loaded.data.registry;
            let Some(name) = registry.canonical(level, canonical.trim()) else {
                bail!("'{canonical}' is not a canonical {level} in {}", registry.snapshot());
            };
            let aliases = loaded.data.aliases.aliases_for(name.as_str(), level);
            println!("{name} ({level}): {} alias(es)", aliases.len());
            for alias in aliases {
                println!("  {alias}");
            }
        }
        RegistryCommand::Doctor { json } => {
            let report = DoctorReport::from_reference(&loaded);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", doctor_table(&report));
            }
        }
    }
    Ok(Outcome::Success)
}

/// Flat CSV form of a resolution result.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    input_text: &'a str,
    method: &'static str,
    matched_level: Option<&'static str>,
    canonical_name: Option<&'a str>,
    province: Option<&'a str>,
    region: Option<&'a str>,
    #[serde(rename = "macro")]
    macro_region: Option<&'a str>,
    confidence: f64,
    candidates: String,
}

impl<'a> ResultRow<'a> {
    fn new(result: &'a ResolutionResult) -> Self {
        let name =
            |value: &'a Option<CanonicalName>| value.as_ref().map(CanonicalName::as_str);
        Self {
            input_text: &result.input_text,
            method: result.method.as_str(),
            matched_level: result.matched_level.map(|l| l.as_str()),
            canonical_name: name(&result.canonical_name),
            province: name(&result.province),
            region: name(&result.region),
            macro_region: name(&result.macro_region),
            confidence: result.confidence,
            candidates: result
                .candidates
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

pub fn write_result_rows<W: io::Write>(writer: W, results: &[ResolutionResult]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for result in results {
        writer.serialize(ResultRow::new(result))?;
    }
    writer.flush()?;
    Ok(())
}
