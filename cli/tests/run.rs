use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ADULT_DOC: &str = r#"{
  "tag": "document",
  "children": [
    {"tag": "symbols", "children": [
      {"tag": "var", "attributes": {"name": "age", "type": "number", "init": "42"}, "line": 3}
    ]},
    {"tag": "rules", "children": [
      {"tag": "rule", "attributes": {"name": "isAdult"}, "text": "age >= 18", "line": 6}
    ]},
    {"tag": "queries", "children": [
      {"tag": "query", "attributes": {"name": "adult"}, "text": "eval(isAdult)", "line": 9}
    ]}
  ]
}"#;

const BROKEN_DOC: &str = r#"{
  "tag": "document",
  "children": [
    {"tag": "queries", "children": [
      {"tag": "query", "attributes": {"name": "fine"}, "text": "1 + 2"},
      {"tag": "query", "attributes": {"name": "broken"}, "text": "1 / 0", "line": 4}
    ]}
  ]
}"#;

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn tenet() -> Command {
    Command::cargo_bin("tenet").unwrap()
}

fn run(path: &Path) -> Command {
    let mut cmd = tenet();
    cmd.arg("run").arg(path);
    cmd
}

#[test]
fn test_cli_run_prints_results() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "adult.json", ADULT_DOC);

    run(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("adult"))
        .stdout(predicate::str::contains("true"))
        .stdout(predicate::str::contains("error").not());
}

#[test]
fn test_cli_run_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "adult.json", ADULT_DOC);

    let output = run(&path).arg("--json").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["results"]["adult"], serde_json::json!(true));
    assert_eq!(json["errors"], serde_json::json!([]));
}

#[test]
fn test_cli_run_reports_errors_with_partial_results() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "broken.json", BROKEN_DOC);

    run(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("fine"))
        .stdout(predicate::str::contains("1 error:"))
        .stdout(predicate::str::contains("error[runtime]: Division by zero"))
        .stdout(predicate::str::contains("--> line 4"));
}

#[test]
fn test_cli_run_strict_exit_code() {
    let dir = TempDir::new().unwrap();
    let broken = write_doc(&dir, "broken.json", BROKEN_DOC);
    let clean = write_doc(&dir, "adult.json", ADULT_DOC);

    run(&broken).arg("--strict").assert().code(2);
    run(&clean).arg("--strict").assert().success();
}

#[test]
fn test_cli_run_trace() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(
        &dir,
        "traced.json",
        r#"{"tag": "document", "children": [
            {"tag": "queries", "children": [
              {"tag": "query", "attributes": {"name": "sum", "trace": "full"}, "text": "1 + 2"}
            ]}
        ]}"#,
    );

    run(&path)
        .arg("--trace")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trace:"))
        .stdout(predicate::str::contains("├─ trace query 'sum'"))
        .stdout(predicate::str::contains("└─ sum = 3"));
}

#[test]
fn test_cli_run_resolves_imports_relative_to_the_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    write_doc(
        &dir,
        "lib/rates.json",
        r#"{"tag": "document", "children": [
            {"tag": "symbols", "children": [
              {"tag": "const", "attributes": {"name": "rate", "type": "number", "init": "0.25"}}
            ]}
        ]}"#,
    );
    let main = write_doc(
        &dir,
        "main.json",
        r#"{"tag": "document", "children": [
            {"tag": "import", "attributes": {"src": "lib/rates.json", "as": "fin"}},
            {"tag": "queries", "children": [
              {"tag": "query", "attributes": {"name": "tax"}, "text": "fin.rate * 100"}
            ]}
        ]}"#,
    );

    let output = run(&main).arg("--json").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["results"]["tax"], serde_json::json!(25));
}

#[test]
fn test_cli_max_depth() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "broken.json", BROKEN_DOC);

    run(&path)
        .args(["--max-depth", "1", "--strict"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "Evaluation depth exceeds the maximum of 1",
        ));
}

#[test]
fn test_cli_check() {
    let dir = TempDir::new().unwrap();
    let clean = write_doc(&dir, "adult.json", ADULT_DOC);
    let invalid = write_doc(
        &dir,
        "invalid.json",
        r#"{"tag": "document", "children": [
            {"tag": "rules", "children": [
              {"tag": "rule", "attributes": {"name": "bad"}, "text": "1 +", "line": 2}
            ]}
        ]}"#,
    );

    tenet()
        .arg("check")
        .arg(&clean)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok (1 symbols, 1 rules)"));

    tenet()
        .arg("check")
        .arg(&invalid)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("error[syntax]"))
        .stdout(predicate::str::contains("--> line 2"));
}

#[test]
fn test_cli_symbols() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "adult.json", ADULT_DOC);

    tenet()
        .arg("symbols")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Symbol"))
        .stdout(predicate::str::contains("age"))
        .stdout(predicate::str::contains("var"))
        .stdout(predicate::str::contains("number"))
        .stdout(predicate::str::contains("42"));
}

#[test]
fn test_cli_missing_file() {
    let dir = TempDir::new().unwrap();

    run(&dir.path().join("nope.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_cli_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "garbage.json", "{ not json");

    run(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a valid document tree"));
}
