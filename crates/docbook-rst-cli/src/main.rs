use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use docbook_rst_backend::{BackendOptions, DocumentConverter};
use docbook_rst_cli::config::Config;
use docbook_rst_cli::{init_logging, Verbosity};
use docbook_rst_core::{ConvertError, JsonOptions, JsonSerializer};
use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

/// Exit code for a missing input file
const EXIT_NOT_FOUND: i32 = 3;
/// Exit code for malformed, empty or unsupported XML
const EXIT_CONVERSION: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
enum OutputFormat {
    /// reStructuredText (default)
    Rst,
    /// Parsed document model as JSON
    Json,
}

/// Convert DocBook XML to reStructuredText
#[derive(Parser, Debug)]
#[command(name = "docbook-to-rst")]
#[command(version, long_about = None)]
struct Args {
    /// DocBook XML file to convert
    input: PathBuf,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Rst)]
    format: OutputFormat,

    /// Compact JSON (no indentation)
    #[arg(long)]
    compact: bool,

    /// Reject documents whose root is not a DocBook element
    #[arg(long)]
    strict: bool,

    /// Use this config file instead of ~/.docbook-rst.toml and ./.docbook-rst.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Exit code for a conversion failure
fn exit_code(err: &ConvertError) -> i32 {
    match err {
        ConvertError::IoError(e) if matches!(e.kind(), io::ErrorKind::NotFound) => {
            EXIT_NOT_FOUND
        }
        ConvertError::IoError(_) => 1,
        ConvertError::ParseError(_)
        | ConvertError::EmptyDocument(_)
        | ConvertError::FormatError(_)
        | ConvertError::BackendError(_)
        | ConvertError::JsonError(_) => EXIT_CONVERSION,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    init_logging(verbosity);

    let config = Config::resolve(args.config.as_deref())?;
    let convert_config = config.convert.unwrap_or_default();
    let rst_options = convert_config.to_rst_options()?;
    let strict = args.strict || convert_config.strict.unwrap_or(false);
    let backend_options = BackendOptions::default().with_strict_root(strict);

    let converter = DocumentConverter::with_options(backend_options, rst_options);
    let result = match converter.convert(&args.input) {
        Ok(result) => result,
        Err(err) => {
            if err.is_not_found() {
                eprintln!(
                    "{} Input file not found: {}",
                    "Error:".red().bold(),
                    args.input.display()
                );
            } else {
                eprintln!(
                    "{} Failed to convert {}: {}",
                    "Error:".red().bold(),
                    args.input.display(),
                    err
                );
            }
            process::exit(exit_code(&err));
        }
    };
    debug!("Converted {} in {:?}", args.input.display(), result.latency);

    let output = match args.format {
        OutputFormat::Rst => result.rst,
        OutputFormat::Json => {
            let serializer = JsonSerializer::with_options(JsonOptions {
                pretty: !args.compact,
            });
            let mut json = serializer
                .serialize_document(&result.document)
                .context("Failed to serialize document as JSON")?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            if verbosity.should_show_output() {
                eprintln!(
                    "{} {} -> {}",
                    "Converted".green().bold(),
                    args.input.display(),
                    path.display()
                );
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}
