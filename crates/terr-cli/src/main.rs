//! `territori` command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use terr_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use terr_cli::commands::{run_coverage, run_registry, run_reshape, run_resolve, run_standardize};
use terr_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let reference_dir = cli.reference_dir.as_deref();
    let outcome = match &cli.command {
        Command::Resolve(args) => run_resolve(args, reference_dir),
        Command::Standardize(args) => run_standardize(args, reference_dir),
        Command::Reshape(args) => run_reshape(args),
        Command::Coverage(args) => run_coverage(args),
        Command::Registry(command) => run_registry(command, reference_dir),
    };
    let exit_code = match outcome {
        Ok(outcome) => outcome.exit_code(),
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "command failed");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
