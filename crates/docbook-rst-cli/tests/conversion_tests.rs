//! Golden-file tests: spawn the built converter and compare its stdout
//! byte-for-byte with the expected reStructuredText.

use docbook_rst_cli::verify::{
    assert_equal, load_expected, run_conversion, verify_deterministic, verify_golden, Converter,
    GoldenCase, VerifyError,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONVERTER: &str = env!("CARGO_BIN_EXE_docbook-to-rst");

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn case(stem: &str) -> GoldenCase {
    GoldenCase::new(
        fixture(&format!("{stem}.xml")),
        fixture(&format!("expected-{stem}.rst")),
    )
}

#[test]
fn test_codeblock() {
    let actual = run_conversion(CONVERTER, fixture("code-example.xml")).unwrap();
    let expected = load_expected(fixture("expected-code-example.rst")).unwrap();
    assert_equal(&actual, &expected);
}

#[test]
fn test_codeblock_text() {
    let actual = run_conversion(CONVERTER, fixture("code-example.xml")).unwrap();
    let text = String::from_utf8(actual).unwrap();
    assert!(text.contains(".. code-block:: python\n\n    print(\"hi\")\n"));
    assert_eq!(
        text,
        fs::read_to_string(fixture("expected-code-example.rst")).unwrap()
    );
}

#[test]
fn test_codeblock_is_deterministic() {
    let converter = Converter::new(CONVERTER);
    let first = verify_deterministic(&converter, fixture("code-example.xml"), 3).unwrap();
    assert_equal(&first, &load_expected(fixture("expected-code-example.rst")).unwrap());
}

#[test]
fn test_all_golden_cases() {
    let converter = Converter::new(CONVERTER);
    for stem in ["code-example", "empty-article", "full-article"] {
        let run = verify_golden(&converter, &case(stem))
            .unwrap_or_else(|e| panic!("{stem}: {e}"));
        assert!(run.status.success());
        assert!(run.stderr.is_empty(), "{stem}: unexpected stderr");
    }
}

#[test]
fn test_empty_article_produces_no_output() {
    let actual = run_conversion(CONVERTER, fixture("empty-article.xml")).unwrap();
    assert!(actual.is_empty());
}

#[test]
fn test_missing_expected_fixture_fails() {
    let converter = Converter::new(CONVERTER);
    let case = GoldenCase::new(
        fixture("code-example.xml"),
        fixture("expected-does-not-exist.rst"),
    );
    let err = verify_golden(&converter, &case).unwrap_err();
    assert!(matches!(err, VerifyError::FixtureMissing { .. }), "{err}");
}

#[test]
fn test_missing_input_fixture_fails() {
    let err = run_conversion(CONVERTER, fixture("does-not-exist.xml")).unwrap_err();
    assert!(matches!(err, VerifyError::FixtureMissing { .. }), "{err}");
}

#[test]
fn test_stale_golden_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let expected = dir.path().join("expected.rst");
    fs::write(
        &expected,
        "Code Example\n============\n\n.. code-block:: python\n\n    print(\"hi\")\n",
    )
    .unwrap();

    let converter = Converter::new(CONVERTER);
    let err = verify_golden(
        &converter,
        &GoldenCase::new(fixture("code-example.xml"), &expected),
    )
    .unwrap_err();

    let VerifyError::OutputMismatch(mismatch) = err else {
        panic!("expected OutputMismatch, got {err:?}");
    };
    assert_eq!(mismatch.line, 4);
    assert_eq!(mismatch.expected_line, ".. code-block:: python");
    assert_eq!(mismatch.actual_line, "The following snippet prints a greeting:");
}

#[test]
fn test_converter_failure_is_non_zero_exit() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("zero.xml");
    fs::write(&input, "").unwrap();

    let err = run_conversion(CONVERTER, &input).unwrap_err();
    match err {
        VerifyError::NonZeroExit { status, stdout, stderr } => {
            assert_eq!(status.code(), Some(5));
            assert!(stdout.is_empty());
            assert!(String::from_utf8_lossy(&stderr).contains("Empty document"));
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}
