//! Verifier behavior against scripted stand-in converters.
#![cfg(unix)]

use docbook_rst_cli::verify::{
    compare_output, run_conversion, verify_deterministic, verify_golden, verify_repeatable,
    Converter, GoldenCase, VerifyError,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Write a POSIX shell converter script; it is run through `sh`.
fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    path
}

fn input(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("in.xml");
    fs::write(&path, "<section/>").unwrap();
    path
}

fn sh(script: &Path) -> Converter {
    Converter::new(script).with_interpreter("sh")
}

#[test]
fn test_stdout_is_captured_verbatim() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "echo.sh", r#"printf 'line\r\nno newline'"#);

    let run = sh(&conv).run(input(&dir)).unwrap();
    assert_eq!(run.stdout, b"line\r\nno newline");
    assert_eq!(run.args[0], "sh");
    assert!(run.args.last().unwrap().ends_with("in.xml"));
}

#[test]
fn test_input_path_is_last_argument() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "args.sh", r#"printf '%s|' "$@""#);
    let input = input(&dir);

    let run = sh(&conv).with_arg("--flag").run(&input).unwrap();
    assert_eq!(
        String::from_utf8(run.stdout).unwrap(),
        format!("--flag|{}|", input.display())
    );
}

#[test]
fn test_non_zero_exit_with_partial_output_fails() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "partial.sh", "printf 'partial'\necho 'boom' >&2\nexit 2");

    let err = sh(&conv).run(input(&dir)).unwrap_err();
    match err {
        VerifyError::NonZeroExit {
            status,
            stdout,
            stderr,
        } => {
            assert_eq!(status.code(), Some(2));
            assert_eq!(stdout, b"partial");
            assert_eq!(stderr, b"boom\n");
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[test]
fn test_error_message_includes_stderr() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "fail.sh", "echo 'bad input' >&2\nexit 1");

    let err = sh(&conv).run(input(&dir)).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Converter exited with"), "{message}");
    assert!(message.ends_with("bad input"), "{message}");
}

#[test]
fn test_large_stderr_does_not_deadlock() {
    let dir = TempDir::new().unwrap();
    // Well past a 64 KiB pipe buffer on both streams
    let conv = script(
        &dir,
        "chatty.sh",
        "i=0\nwhile [ $i -lt 5000 ]; do\n  echo 'warning: something noisy happened here' >&2\n  echo 'out line of converter output text'\n  i=$((i+1))\ndone",
    );

    let run = sh(&conv)
        .with_timeout(Duration::from_secs(60))
        .run(input(&dir))
        .unwrap();
    assert_eq!(run.stdout.len(), 5000 * 34);
    assert_eq!(run.stderr.len(), 5000 * 39);
}

#[test]
fn test_timeout_kills_converter() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "hang.sh", "exec sleep 30");

    let start = Instant::now();
    let err = sh(&conv)
        .with_timeout(Duration::from_millis(200))
        .run(input(&dir))
        .unwrap_err();
    assert!(matches!(err, VerifyError::Timeout { after } if after == Duration::from_millis(200)));
    assert!(start.elapsed() < Duration::from_secs(20));
}

#[test]
fn test_timeout_covers_output_held_open_after_exit() {
    let dir = TempDir::new().unwrap();
    // The background sleep inherits stdout and keeps the pipe open
    let conv = script(&dir, "detach.sh", "printf 'partial'\nsleep 30 &\nexit 0");

    let start = Instant::now();
    let err = sh(&conv)
        .with_timeout(Duration::from_millis(300))
        .run(input(&dir))
        .unwrap_err();
    assert!(matches!(err, VerifyError::Timeout { .. }), "{err:?}");
    assert!(start.elapsed() < Duration::from_secs(20));
}

#[test]
fn test_repeat_runs_compare_against_existing_output() {
    let dir = TempDir::new().unwrap();
    let counter = dir.path().join("count");
    let conv = script(
        &dir,
        "counter.sh",
        &format!(
            "echo x >> '{c}'\nwc -l < '{c}' | tr -d ' '",
            c = counter.display()
        ),
    );
    let input = input(&dir);

    let first = sh(&conv).run(&input).unwrap();
    verify_repeatable(&sh(&conv), &input, &first.stdout, 0).unwrap();
    let err = verify_repeatable(&sh(&conv), &input, &first.stdout, 3).unwrap_err();
    assert!(matches!(err, VerifyError::OutputMismatch(_)));

    // One reference run plus the single repeat that failed
    assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 2);
}

#[test]
fn test_unstable_converter_fails_determinism() {
    let dir = TempDir::new().unwrap();
    let counter = dir.path().join("count");
    let conv = script(
        &dir,
        "counter.sh",
        &format!(
            "echo x >> '{c}'\nwc -l < '{c}' | tr -d ' '",
            c = counter.display()
        ),
    );

    let err = verify_deterministic(&sh(&conv), input(&dir), 2).unwrap_err();
    let VerifyError::OutputMismatch(mismatch) = err else {
        panic!("expected OutputMismatch, got {err:?}");
    };
    assert_eq!(mismatch.actual_line, "2");
    assert_eq!(mismatch.expected_line, "1");
}

#[test]
fn test_golden_pass_and_fail() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "fixed.sh", "printf 'Title\\n=====\\n'");
    let good = dir.path().join("good.rst");
    let bad = dir.path().join("bad.rst");
    fs::write(&good, "Title\n=====\n").unwrap();
    fs::write(&bad, "Title\n-----\n").unwrap();

    let input = input(&dir);
    verify_golden(&sh(&conv), &GoldenCase::new(&input, &good)).unwrap();

    let err = verify_golden(&sh(&conv), &GoldenCase::new(&input, &bad)).unwrap_err();
    assert!(matches!(err, VerifyError::OutputMismatch(_)));

    // Golden files are never rewritten
    assert_eq!(fs::read(&bad).unwrap(), b"Title\n-----\n");
}

#[test]
fn test_run_conversion_returns_stdout() {
    let dir = TempDir::new().unwrap();
    let conv = script(&dir, "direct.sh", "printf 'ok\\n'");
    let input = input(&dir);

    // Invoked directly rather than through an interpreter
    fs::set_permissions(&conv, fs::Permissions::from_mode(0o755)).unwrap();
    let stdout = run_conversion(&conv, &input).unwrap();
    assert_eq!(compare_output(&stdout, b"ok\n"), Ok(()));
}
