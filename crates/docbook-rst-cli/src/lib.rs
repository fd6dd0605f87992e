//! Command-line tools for docbook-rst
//!
//! This crate provides two binaries:
//!
//! - `docbook-to-rst` converts one DocBook file to reStructuredText on stdout
//! - `conversion-verify` runs any converter against golden files
//!
//! # Quick Start
//!
//! ```bash
//! # Convert to stdout
//! docbook-to-rst tests/fixtures/code-example.xml
//!
//! # Convert to a file, or dump the document model
//! docbook-to-rst guide.xml -o guide.rst
//! docbook-to-rst guide.xml --format json
//!
//! # Check a converter against a golden file
//! conversion-verify --converter target/debug/docbook-to-rst \
//!     --input tests/fixtures/code-example.xml \
//!     --expected tests/fixtures/expected-code-example.rst
//!
//! # Check a script converter, run three times, give up after 30s
//! conversion-verify --interpreter python --converter DocBookToReST.py \
//!     --input in.xml --expected out.rst --runs 3 --timeout 30
//! ```
//!
//! # Exit Codes
//!
//! `docbook-to-rst`:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | General error (bad config, unwritable output) |
//! | 3 | Input file not found |
//! | 5 | Conversion error (malformed or empty XML) |
//!
//! `conversion-verify` exits 0 when every case passes and 1 otherwise.
//!
//! # Configuration
//!
//! Both tools read `.docbook-rst.toml` from the home directory and the
//! working directory; see [`config`].

pub mod config;
pub mod verify;

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors (default)
    Normal,
    /// Debug logging
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    #[must_use = "returns the verbosity"]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if non-error output should be shown
    #[must_use = "checks whether output should be shown"]
    pub const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Default `log` filter when `RUST_LOG` is unset
    #[must_use = "returns the default log filter"]
    pub const fn default_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

/// Initialise `env_logger` on stderr; stdout stays reserved for output.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub fn init_logging(verbosity: Verbosity) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.default_filter()),
    )
    .target(env_logger::Target::Stderr)
    .init();
}
