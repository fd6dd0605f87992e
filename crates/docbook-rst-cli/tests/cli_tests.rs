//! Integration tests for the `docbook-to-rst` binary
//!
//! Each test runs the built binary against the shared fixtures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docbook-to-rst"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Convert DocBook XML to reStructuredText"));
}

#[test]
fn test_convert_code_example_to_stdout() {
    let expected = fs::read_to_string(fixture("expected-code-example.rst")).unwrap();
    cli()
        .arg(fixture("code-example.xml"))
        .assert()
        .success()
        .stdout(expected)
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_convert_empty_article_writes_nothing() {
    cli()
        .arg(fixture("empty-article.xml"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_input_exit_code() {
    cli()
        .arg(fixture("does-not-exist.xml"))
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_malformed_input_exit_code() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.xml");
    fs::write(&input, "<section><para>unclosed</section>").unwrap();

    cli()
        .arg(&input)
        .assert()
        .code(5)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("broken.xml"));
}

#[test]
fn test_zero_byte_input_exit_code() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("zero.xml");
    fs::write(&input, "").unwrap();

    cli()
        .arg(&input)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Empty document"));
}

#[test]
fn test_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.rst");

    cli()
        .arg(fixture("code-example.xml"))
        .arg("-o")
        .arg(&output)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(
        fs::read(&output).unwrap(),
        fs::read(fixture("expected-code-example.rst")).unwrap()
    );
}

#[test]
fn test_json_format() {
    let output = cli()
        .arg(fixture("code-example.xml"))
        .args(["--format", "json", "--compact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["metadata"]["root_element"], "section");
    assert_eq!(value["metadata"]["source"], "code-example");
    let items = value["items"].as_array().unwrap();
    assert_eq!(items[0]["type"], "heading");
    assert_eq!(items[2]["type"], "code_block");
    assert_eq!(items[2]["language"], "python");
}

#[test]
fn test_config_file_options() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[convert]\nindent = 2\nheading_chars = \"#\"\n").unwrap();

    cli()
        .arg(fixture("code-example.xml"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Code Example\n############\n"))
        .stdout(predicate::str::ends_with("\n\n  print(\"hi\")\n"));
}

#[test]
fn test_invalid_config_is_general_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[convert\n").unwrap();

    cli()
        .arg(fixture("code-example.xml"))
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_strict_rejects_foreign_root() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("page.xml");
    fs::write(&input, "<html><body>hi</body></html>").unwrap();

    cli().arg(&input).arg("--strict").assert().code(5);
    cli().arg(&input).assert().success().stdout("hi\n");
}

// ============ conversion-verify ============

fn verify_cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_conversion-verify"))
}

#[test]
fn test_verify_passes_golden_case() {
    verify_cli()
        .arg("--converter")
        .arg(env!("CARGO_BIN_EXE_docbook-to-rst"))
        .arg("--input")
        .arg(fixture("code-example.xml"))
        .arg("--expected")
        .arg(fixture("expected-code-example.rst"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("code-example"))
        .stdout(predicate::str::contains("1 passed, 0 failed"));
}

#[test]
fn test_verify_reports_mismatch() {
    verify_cli()
        .arg("--converter")
        .arg(env!("CARGO_BIN_EXE_docbook-to-rst"))
        .arg("--input")
        .arg(fixture("code-example.xml"))
        .arg("--expected")
        .arg(fixture("expected-full-article.rst"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("--- expected"))
        .stdout(predicate::str::contains("0 passed, 1 failed"));
}

#[test]
fn test_verify_missing_expected_fails() {
    verify_cli()
        .arg("--converter")
        .arg(env!("CARGO_BIN_EXE_docbook-to-rst"))
        .arg("--input")
        .arg(fixture("code-example.xml"))
        .arg("--expected")
        .arg(fixture("expected-missing.rst"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Fixture not found"));
}

#[test]
fn test_verify_cases_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("verify.toml");
    let mut toml = format!(
        "[verify]\nconverter = {:?}\nruns = 2\ntimeout_secs = 60\n",
        env!("CARGO_BIN_EXE_docbook-to-rst")
    );
    for stem in ["code-example", "empty-article", "full-article"] {
        toml.push_str(&format!(
            "\n[[verify.cases]]\ninput = {:?}\nexpected = {:?}\n",
            fixture(&format!("{stem}.xml")).display().to_string(),
            fixture(&format!("expected-{stem}.rst")).display().to_string()
        ));
    }
    fs::write(&config, toml).unwrap();

    verify_cli()
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 passed, 0 failed"));
}

#[test]
fn test_verify_without_converter_is_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("empty.toml");
    fs::write(&config, "").unwrap();

    verify_cli()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No converter given"));
}

#[test]
fn test_verify_help() {
    verify_cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Verify a converter against golden reStructuredText files",
        ));
}

#[cfg(unix)]
#[test]
fn test_verify_runs_converter_exactly_runs_times() {
    let dir = TempDir::new().unwrap();
    let counter = dir.path().join("count");
    let converter = dir.path().join("counting.sh");
    fs::write(
        &converter,
        format!("echo x >> '{}'\nprintf 'ok\\n'\n", counter.display()),
    )
    .unwrap();
    let input = dir.path().join("in.xml");
    fs::write(&input, "<section/>").unwrap();
    let expected = dir.path().join("expected.rst");
    fs::write(&expected, "ok\n").unwrap();

    verify_cli()
        .arg("--converter")
        .arg(&converter)
        .arg("--interpreter")
        .arg("sh")
        .arg("--input")
        .arg(&input)
        .arg("--expected")
        .arg(&expected)
        .arg("--runs")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 0 failed"));

    assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 3);
}
