//! Argument parsing and end-to-end command runs on temporary files.

use clap::Parser;

use terr_cli::cli::{Cli, Command, CoverageLevelArg, LevelArg, OutputFormatArg, RegistryCommand};
use terr_cli::commands::{
    Outcome, run_coverage, run_registry, run_reshape, run_resolve, run_standardize,
};
use terr_coverage::read_standardized;
use terr_model::{Level, MatchMethod};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("territori").chain(args.iter().copied())).unwrap()
}

#[test]
fn resolve_arguments() {
    let cli = parse(&[
        "resolve",
        "Roma",
        "Reggio",
        "--level",
        "province",
        "--threshold",
        "0.93",
        "--format",
        "json",
        "--fail-on-unresolved",
    ]);
    let Command::Resolve(args) = cli.command else {
        panic!("expected resolve");
    };
    assert_eq!(args.labels, vec!["Roma", "Reggio"]);
    assert_eq!(args.level, Some(LevelArg::Province));
    assert_eq!(args.policy.threshold, Some(0.93));
    assert_eq!(args.format, OutputFormatArg::Json);
    assert!(args.fail_on_unresolved);
}

#[test]
fn global_flags_after_subcommand() {
    let cli = parse(&["registry", "list", "--reference-dir", "snap", "--log-level", "debug"]);
    assert_eq!(cli.reference_dir.as_deref(), Some(std::path::Path::new("snap")));
    assert!(matches!(
        cli.command,
        Command::Registry(RegistryCommand::List { level: None })
    ));
}

#[test]
fn coverage_gaps_defaults_to_full_coverage() {
    let cli = parse(&["coverage", "std.csv", "--level", "region", "--gaps"]);
    let Command::Coverage(args) = cli.command else {
        panic!("expected coverage");
    };
    assert_eq!(args.level, CoverageLevelArg::Region);
    assert_eq!(args.gaps, Some(1.0));
}

#[test]
fn coverage_rejects_macro_level() {
    let result = Cli::try_parse_from(["territori", "coverage", "std.csv", "--level", "macro"]);
    assert!(result.is_err());
}

#[test]
fn resolve_fails_on_ambiguous_when_asked() {
    let cli = parse(&["resolve", "Reggio", "--format", "csv", "--fail-on-unresolved"]);
    let Command::Resolve(args) = cli.command else {
        panic!("expected resolve");
    };
    assert_eq!(run_resolve(&args, None).unwrap(), Outcome::NeedsReview);

    let cli = parse(&["resolve", "Roma", "--format", "csv", "--fail-on-unresolved"]);
    let Command::Resolve(args) = cli.command else {
        panic!("expected resolve");
    };
    assert_eq!(run_resolve(&args, None).unwrap(), Outcome::Success);
}

#[test]
fn resolve_without_labels_is_an_error() {
    let cli = parse(&["resolve"]);
    let Command::Resolve(args) = cli.command else {
        panic!("expected resolve");
    };
    assert!(run_resolve(&args, None).is_err());
}

#[test]
fn reshape_standardize_coverage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let wide = dir.path().join("wide.csv");
    let tidy = dir.path().join("tidy.csv");
    let standardized = dir.path().join("standardized.csv");
    let report = dir.path().join("review.json");
    let coverage = dir.path().join("coverage.csv");
    std::fs::write(
        &wide,
        "Territorio,Popolazione,\n,2021,2022\nProvincia di Roma,1,2\nMilano,3,..\nAtlantide,4,5\n",
    )
    .unwrap();

    let path = |p: &std::path::Path| p.to_str().unwrap().to_string();

    let cli = parse(&["reshape", &path(&wide), "--output", &path(&tidy)]);
    let Command::Reshape(args) = cli.command else {
        panic!("expected reshape");
    };
    assert_eq!(run_reshape(&args).unwrap(), Outcome::Success);

    let cli = parse(&[
        "standardize",
        &path(&tidy),
        "--output",
        &path(&standardized),
        "--report",
        &path(&report),
        "--fail-on-unresolved",
    ]);
    let Command::Standardize(args) = cli.command else {
        panic!("expected standardize");
    };
    assert_eq!(run_standardize(&args, None).unwrap(), Outcome::NeedsReview);

    let records = read_standardized(&standardized).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].province_std.as_deref(), Some("Roma"));
    assert_eq!(records[0].level, Some(Level::Province));
    assert_eq!(records[4].match_method, MatchMethod::Unresolved);

    let review: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(review["review"][0]["input_text"], "Atlantide");

    let cli = parse(&[
        "coverage",
        &path(&standardized),
        "--level",
        "province",
        "--missing",
        "Popolazione:2022",
        "--heatmap",
        "--output",
        &path(&coverage),
    ]);
    let Command::Coverage(args) = cli.command else {
        panic!("expected coverage");
    };
    assert_eq!(run_coverage(&args).unwrap(), Outcome::Success);
    let written = std::fs::read_to_string(&coverage).unwrap();
    assert!(written.starts_with("level,variable,year,present_count"));
    assert!(written.contains("province,Popolazione,2022,1,2,1,0.5"));
}

#[test]
fn registry_aliases_rejects_unknown_canonical() {
    let cli = parse(&["registry", "aliases", "Atlantide", "--level", "province"]);
    let Command::Registry(command) = cli.command else {
        panic!("expected registry");
    };
    assert!(run_registry(&command, None).is_err());

    let cli = parse(&["registry", "aliases", "Bolzano/Bozen"]);
    let Command::Registry(command) = cli.command else {
        panic!("expected registry");
    };
    assert_eq!(run_registry(&command, None).unwrap(), Outcome::Success);
}
