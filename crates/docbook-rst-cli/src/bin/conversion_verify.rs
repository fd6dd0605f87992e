//! Golden-file checker for DocBook to RST converters.
//!
//! Runs a converter on each case, compares stdout with the expected file and
//! repeats the run to check that output is stable.

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use docbook_rst_cli::config::{Config, VerifyConfig};
use docbook_rst_cli::verify::{verify_golden, verify_repeatable, Converter, GoldenCase};
use docbook_rst_cli::{init_logging, Verbosity};
use log::debug;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// Default number of runs per case for the determinism check
const DEFAULT_RUNS: usize = 2;

/// Verify a converter against golden reStructuredText files
#[derive(Parser, Debug)]
#[command(name = "conversion-verify")]
#[command(version, long_about = None)]
struct Args {
    /// Converter executable or script (default: verify.converter from config)
    #[arg(long, value_name = "PATH")]
    converter: Option<PathBuf>,

    /// Run the converter through this interpreter (e.g. python)
    #[arg(long, value_name = "PROG")]
    interpreter: Option<PathBuf>,

    /// DocBook input fixture
    #[arg(long, value_name = "XML", requires = "expected")]
    input: Option<PathBuf>,

    /// Expected reStructuredText output
    #[arg(long, value_name = "RST", requires = "input")]
    expected: Option<PathBuf>,

    /// Kill the converter after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Runs per case for the determinism check (minimum 2; 1 skips the check)
    #[arg(long, value_name = "N")]
    runs: Option<usize>,

    /// Use this config file instead of ~/.docbook-rst.toml and ./.docbook-rst.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print failures
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Apply CLI overrides to the configured verify settings
fn effective_settings(args: &Args, config: Config) -> VerifyConfig {
    let mut settings = config.verify.unwrap_or_default();
    if args.interpreter.is_some() {
        settings.interpreter.clone_from(&args.interpreter);
    }
    if args.timeout.is_some() {
        settings.timeout_secs = args.timeout;
    }
    if args.runs.is_some() {
        settings.runs = args.runs;
    }
    settings
}

fn cases(args: &Args, settings: &VerifyConfig) -> Result<Vec<GoldenCase>> {
    if let (Some(input), Some(expected)) = (&args.input, &args.expected) {
        return Ok(vec![GoldenCase::new(input, expected)]);
    }
    if settings.cases.is_empty() {
        bail!("No cases to verify; pass --input and --expected or add [[verify.cases]] to the config");
    }
    Ok(settings.cases.iter().map(GoldenCase::from).collect())
}

/// Run one case `runs` times in total; returns the failure message, if any
fn check(converter: &Converter, case: &GoldenCase, runs: usize) -> Result<Duration, String> {
    let run = verify_golden(converter, case).map_err(|e| e.to_string())?;
    if runs > 1 {
        verify_repeatable(converter, &case.input, &run.stdout, runs - 1)
            .map_err(|e| format!("output is not stable across {runs} runs\n{e}"))?;
    }
    Ok(run.elapsed)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    init_logging(verbosity);

    let config = Config::resolve(args.config.as_deref())?;
    let settings = effective_settings(&args, config);
    let converter = settings.converter(args.converter.as_deref())?;
    let runs = settings.runs.unwrap_or(DEFAULT_RUNS);
    let cases = cases(&args, &settings)?;
    debug!("Verifying {} case(s) with {:?}", cases.len(), converter);

    let mut failed = 0;
    for case in &cases {
        match check(&converter, case, runs) {
            Ok(elapsed) => {
                if verbosity.should_show_output() {
                    println!("{} {} ({:.2?})", "PASS".green().bold(), case.name(), elapsed);
                }
            }
            Err(message) => {
                failed += 1;
                println!("{} {}", "FAIL".red().bold(), case.name());
                for line in message.lines() {
                    println!("    {line}");
                }
            }
        }
    }

    if verbosity.should_show_output() || failed > 0 {
        let summary = format!("{} passed, {} failed", cases.len() - failed, failed);
        if failed == 0 {
            println!("{}", summary.green());
        } else {
            println!("{}", summary.red());
        }
    }

    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}
