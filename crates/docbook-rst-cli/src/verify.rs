//! Golden-file verification of converter processes
//!
//! A converter is any executable that takes a DocBook file as its single
//! positional argument and writes reStructuredText to stdout. The verifier
//! spawns it, captures stdout and stderr, checks the exit status and compares
//! the output byte-for-byte with a golden file.
//!
//! ```rust,no_run
//! use docbook_rst_cli::verify::{verify_golden, Converter, GoldenCase};
//!
//! let converter = Converter::new("target/debug/docbook-to-rst");
//! let case = GoldenCase::new(
//!     "tests/fixtures/code-example.xml",
//!     "tests/fixtures/expected-code-example.rst",
//! );
//! verify_golden(&converter, &case)?;
//! # Ok::<(), docbook_rst_cli::verify::VerifyError>(())
//! ```

use log::{debug, info, warn};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Interval between `try_wait` polls when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lines of unchanged context shown around the first difference
const DIFF_CONTEXT: usize = 2;

/// Maximum number of lines printed per side in a mismatch diff
const DIFF_MAX_LINES: usize = 12;

/// Errors raised while running or checking a converter
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Input or expected-output fixture does not exist
    #[error("Fixture not found: {}", path.display())]
    FixtureMissing { path: PathBuf },

    /// Converter given as a path does not exist
    #[error("Converter not found: {}", path.display())]
    ConverterMissing { path: PathBuf },

    /// The OS refused to start the converter
    #[error("Failed to launch {program}: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Converter terminated with a failure status
    #[error(
        "Converter exited with {status}: {}",
        String::from_utf8_lossy(.stderr).trim_end()
    )]
    NonZeroExit {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    /// Output differs from the golden file
    #[error("{0}")]
    OutputMismatch(Box<Mismatch>),

    /// Converter did not finish within the configured timeout
    #[error("Converter did not finish within {after:?}")]
    Timeout { after: Duration },

    /// Other I/O failure while talking to the child process
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl VerifyError {
    /// `true` when a fixture or the converter itself is missing
    #[inline]
    #[must_use = "checks whether this is a not-found error"]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FixtureMissing { .. } | Self::ConverterMissing { .. }
        )
    }
}

/// One finished converter invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRun {
    /// Full command line, lossily converted for display
    pub args: Vec<String>,
    /// Everything the converter wrote to stdout
    pub stdout: Vec<u8>,
    /// Everything the converter wrote to stderr
    pub stderr: Vec<u8>,
    /// Exit status
    pub status: ExitStatus,
    /// Wall-clock time from spawn to exit
    pub elapsed: Duration,
}

/// A DocBook input paired with its golden RST output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoldenCase {
    pub input: PathBuf,
    pub expected: PathBuf,
}

impl GoldenCase {
    #[inline]
    #[must_use = "creates a golden case"]
    pub fn new(input: impl Into<PathBuf>, expected: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
        }
    }

    /// Short name for reports: the input file stem
    #[must_use = "returns the case name"]
    pub fn name(&self) -> String {
        self.input
            .file_stem()
            .map_or_else(|| self.input.display().to_string(), |s| {
                s.to_string_lossy().into_owned()
            })
    }
}

/// Command builder for a converter process.
///
/// The input path is always appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Converter {
    program: PathBuf,
    interpreter: Option<PathBuf>,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl Converter {
    /// Converter executed directly
    #[inline]
    #[must_use = "creates a converter"]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            interpreter: None,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Run the program through an interpreter (`python script.py <input>`)
    #[inline]
    #[must_use = "returns the converter with an interpreter"]
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    /// Extra argument placed before the input path
    #[inline]
    #[must_use = "returns the converter with an extra argument"]
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Kill the converter if it runs longer than `timeout`.
    ///
    /// Without a timeout [`run`](Self::run) waits indefinitely.
    #[inline]
    #[must_use = "returns the converter with a timeout"]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[inline]
    #[must_use = "returns the converter program"]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[inline]
    #[must_use = "returns the configured timeout"]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn command(&self, input: &Path) -> (Command, Vec<String>) {
        let mut argv: Vec<&std::ffi::OsStr> = Vec::new();
        if let Some(interpreter) = &self.interpreter {
            argv.push(interpreter.as_os_str());
        }
        argv.push(self.program.as_os_str());
        argv.extend(self.args.iter().map(OsString::as_os_str));
        argv.push(input.as_os_str());

        let display = argv
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let mut command = Command::new(argv[0]);
        command
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        (command, display)
    }

    /// Spawn the converter on `input` and capture its output.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::FixtureMissing`] if `input` does not exist
    /// - [`VerifyError::ConverterMissing`] if the program is a path that does
    ///   not exist
    /// - [`VerifyError::ProcessLaunch`] if spawning fails
    /// - [`VerifyError::Timeout`] if a timeout is set and exceeded
    /// - [`VerifyError::NonZeroExit`] if the converter reports failure, even
    ///   when it wrote partial output
    pub fn run(&self, input: impl AsRef<Path>) -> Result<ConversionRun, VerifyError> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(VerifyError::FixtureMissing {
                path: input.to_path_buf(),
            });
        }
        if is_path_like(&self.program) && !self.program.exists() {
            return Err(VerifyError::ConverterMissing {
                path: self.program.clone(),
            });
        }

        let (mut command, args) = self.command(input);
        info!("Running {}", args.join(" "));

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| VerifyError::ProcessLaunch {
            program: args[0].clone(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            None => child.wait()?,
            Some(limit) => loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if start.elapsed() >= limit {
                    warn!("{} timed out after {:?}, killing", args[0], limit);
                    // The child may exit between try_wait and kill
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(VerifyError::Timeout { after: limit });
                }
                thread::sleep(POLL_INTERVAL);
            },
        };

        // A grandchild that inherited the pipes keeps the readers blocked
        // after the converter itself has exited
        if let Some(limit) = self.timeout {
            while !(stdout.is_finished() && stderr.is_finished()) {
                if start.elapsed() >= limit {
                    warn!("{} output still open after {:?}, giving up", args[0], limit);
                    return Err(VerifyError::Timeout { after: limit });
                }
                thread::sleep(POLL_INTERVAL);
            }
        }

        let stdout = join_reader(stdout)?;
        let stderr = join_reader(stderr)?;
        let elapsed = start.elapsed();
        debug!(
            "{} exited with {} after {:?} ({} bytes stdout, {} bytes stderr)",
            args[0],
            status,
            elapsed,
            stdout.len(),
            stderr.len()
        );

        if !status.success() {
            return Err(VerifyError::NonZeroExit {
                status,
                stdout,
                stderr,
            });
        }

        Ok(ConversionRun {
            args,
            stdout,
            stderr,
            status,
            elapsed,
        })
    }
}

fn is_path_like(program: &Path) -> bool {
    program.is_absolute() || program.components().count() > 1
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_reader(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>, VerifyError> {
    let bytes = handle
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))??;
    Ok(bytes)
}

/// Run `converter_path <input_path>` and return its stdout.
///
/// # Errors
///
/// See [`Converter::run`].
pub fn run_conversion(
    converter_path: impl AsRef<Path>,
    input_path: impl AsRef<Path>,
) -> Result<Vec<u8>, VerifyError> {
    Converter::new(converter_path.as_ref())
        .run(input_path)
        .map(|run| run.stdout)
}

/// Read a golden file in full.
///
/// # Errors
///
/// [`VerifyError::FixtureMissing`] if the file does not exist, otherwise
/// [`VerifyError::Io`].
pub fn load_expected(fixture_path: impl AsRef<Path>) -> Result<Vec<u8>, VerifyError> {
    let path = fixture_path.as_ref();
    fs::read(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            VerifyError::FixtureMissing {
                path: path.to_path_buf(),
            }
        } else {
            VerifyError::Io(err)
        }
    })
}

/// First difference between actual and expected output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Byte offset of the first difference
    pub offset: usize,
    /// 1-based line of `offset`
    pub line: usize,
    /// 1-based byte column of `offset`
    pub column: usize,
    /// The line of actual output containing `offset`
    pub actual_line: String,
    /// The line of expected output containing `offset`
    pub expected_line: String,
    pub actual_len: usize,
    pub expected_len: usize,
    actual: String,
    expected: String,
}

impl Mismatch {
    fn new(actual: &[u8], expected: &[u8]) -> Option<Self> {
        let offset = first_difference(actual, expected)?;
        let prefix = &expected[..offset];
        let line_start = prefix
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;

        Some(Self {
            offset,
            line,
            column: offset - line_start + 1,
            actual_line: line_at(actual, line_start),
            expected_line: line_at(expected, line_start),
            actual_len: actual.len(),
            expected_len: expected.len(),
            actual: String::from_utf8_lossy(actual).into_owned(),
            expected: String::from_utf8_lossy(expected).into_owned(),
        })
    }
}

fn first_difference(actual: &[u8], expected: &[u8]) -> Option<usize> {
    actual
        .iter()
        .zip(expected)
        .position(|(a, e)| a != e)
        .or_else(|| (actual.len() != expected.len()).then(|| actual.len().min(expected.len())))
}

fn line_at(bytes: &[u8], start: usize) -> String {
    let rest = bytes.get(start..).unwrap_or_default();
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    String::from_utf8_lossy(&rest[..end]).into_owned()
}

/// Make carriage returns and tabs visible in diff lines
fn visible(line: &str) -> String {
    line.replace('\r', "\\r").replace('\t', "\\t")
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Output differs at byte {} (line {}, column {}): expected {} bytes, got {} bytes",
            self.offset, self.line, self.column, self.expected_len, self.actual_len
        )?;
        writeln!(f, "--- expected")?;
        writeln!(f, "+++ actual")?;

        let expected: Vec<&str> = self.expected.split('\n').collect();
        let actual: Vec<&str> = self.actual.split('\n').collect();
        let first = self.line.saturating_sub(1 + DIFF_CONTEXT);
        let last = expected.len().max(actual.len());

        let mut shown = 0;
        for i in first..last {
            if shown >= DIFF_MAX_LINES {
                writeln!(f, "...")?;
                break;
            }
            match (expected.get(i), actual.get(i)) {
                (Some(e), Some(a)) if e == a => {
                    if i + 1 > self.line + DIFF_CONTEXT {
                        break;
                    }
                    writeln!(f, " {}", visible(e))?;
                }
                (e, a) => {
                    if let Some(e) = e {
                        writeln!(f, "-{}", visible(e))?;
                    }
                    if let Some(a) = a {
                        writeln!(f, "+{}", visible(a))?;
                    }
                }
            }
            shown += 1;
        }
        Ok(())
    }
}

/// Byte-exact comparison of converter output with a golden file.
///
/// # Errors
///
/// Returns the first [`Mismatch`] when the buffers differ.
pub fn compare_output(actual: &[u8], expected: &[u8]) -> Result<(), Mismatch> {
    Mismatch::new(actual, expected).map_or(Ok(()), Err)
}

/// Panic with a readable diff unless `actual == expected`.
///
/// # Panics
///
/// When the buffers differ.
#[track_caller]
pub fn assert_equal(actual: &[u8], expected: &[u8]) {
    if let Err(mismatch) = compare_output(actual, expected) {
        panic!("{mismatch}");
    }
}

/// Run the converter on a case and compare with its golden file.
///
/// # Errors
///
/// Any error from [`Converter::run`] or [`load_expected`], or
/// [`VerifyError::OutputMismatch`].
pub fn verify_golden(
    converter: &Converter,
    case: &GoldenCase,
) -> Result<ConversionRun, VerifyError> {
    let run = converter.run(&case.input)?;
    let expected = load_expected(&case.expected)?;
    compare_output(&run.stdout, &expected)
        .map_err(|mismatch| VerifyError::OutputMismatch(Box::new(mismatch)))?;
    debug!("{} matches {}", case.input.display(), case.expected.display());
    Ok(run)
}

/// Run the converter `runs` times (at least twice) and require identical
/// output each time. Returns the output of the first run.
///
/// # Errors
///
/// Any error from [`Converter::run`], or [`VerifyError::OutputMismatch`]
/// when a later run differs from the first.
pub fn verify_deterministic(
    converter: &Converter,
    input: impl AsRef<Path>,
    runs: usize,
) -> Result<Vec<u8>, VerifyError> {
    let input = input.as_ref();
    let first = converter.run(input)?.stdout;
    verify_repeatable(converter, input, &first, runs.max(2) - 1)?;
    Ok(first)
}

/// Run the converter `extra_runs` more times and require each output to
/// equal `reference`, the output of a run already made.
///
/// # Errors
///
/// Any error from [`Converter::run`], or [`VerifyError::OutputMismatch`]
/// when a run differs from `reference`.
pub fn verify_repeatable(
    converter: &Converter,
    input: impl AsRef<Path>,
    reference: &[u8],
    extra_runs: usize,
) -> Result<(), VerifyError> {
    let input = input.as_ref();
    for n in 0..extra_runs {
        let next = converter.run(input)?.stdout;
        compare_output(&next, reference).map_err(|mismatch| {
            warn!("run {} of {} differs from the first", n + 2, input.display());
            VerifyError::OutputMismatch(Box::new(mismatch))
        })?;
    }
    Ok(())
}
