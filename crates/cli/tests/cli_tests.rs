// Integration tests for the `jrecon` binary: exit codes, stdout contract, written reports.
//
// Run with: cargo test -p jrecon-cli --test cli_tests -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

fn jrecon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_jrecon"))
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert stdout is a single, parseable JSON value.
fn single_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("stdout must be valid JSON: {e}\nstdout:\n{trimmed}"))
}

const SYSTEM1: &str = r#"{"X.1": {"a": 1, "b": [1, 2]}, "Y.1": {"a": 5}}"#;
const SYSTEM2: &str = r#"{"X.1": {"a": 1, "b": [2, 1]}, "Z.3": {"a": 7}}"#;

// ===========================================================================
// jrecon compare
// ===========================================================================

#[test]
fn compare_clean_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);

    let output = jrecon()
        .args(["compare", &a, &a, "--path", "a", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let report = single_json(&output);
    assert_eq!(report["summary"]["fully_matched_keys"], 2);
    assert_eq!(report["entries"].as_array().unwrap().len(), 4);
}

#[test]
fn compare_with_diffs_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let b = write(dir.path(), "b.json", SYSTEM2);

    let output = jrecon()
        .args(["compare", &a, &b, "-p", "a", "-p", "b", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report = single_json(&output);
    let entries = report["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["key"], "X.1");
    assert_eq!(entries[0]["values"]["a"]["outcome"], "match");
    assert_eq!(entries[1]["values"]["b"]["outcome"], "mismatch");
    assert_eq!(entries[2]["key"], "Y.1");
    assert_eq!(entries[2]["source"], "source1");
    assert_eq!(entries[3]["key"], "Z.3");
    assert_eq!(entries[3]["values"]["a"]["outcome"], "orphan");
    assert!(stderr(&output).contains("1 with mismatches"));
}

#[test]
fn compare_no_fail_exits_zero_with_diffs() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let b = write(dir.path(), "b.json", SYSTEM2);

    let output = jrecon()
        .args(["compare", &a, &b, "-p", "b", "--no-fail"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty(), "no report on stdout without --json");
}

#[test]
fn compare_paths_file_and_csv_output() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let b = write(dir.path(), "b.json", SYSTEM2);
    let paths = write(dir.path(), "paths.txt", "a\n\n  b  \n");
    let out = dir.path().join("report.csv");

    let output = jrecon()
        .args(["compare", &a, &b, "--paths-file", &paths, "--label1", "Catalog", "--label2", "Shop"])
        .args(["--output", out.to_str().unwrap(), "--no-fail"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "System,ID,Version,Attribute,Value (Catalog),Value (Shop),Outcome");
    assert_eq!(lines[1], "Both,X,1,a,1,1,match");
    assert_eq!(lines[2], "Both,X,1,b,\"[1,2]\",\"[2,1]\",mismatch");
    assert_eq!(lines[3], "Catalog,Y,1,a,5,,orphan");
    assert_eq!(lines[5], "Shop,Z,3,a,,7,orphan");
    assert_eq!(lines.len(), 1 + 3 * 2);
}

#[test]
fn compare_writes_xlsx_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let b = write(dir.path(), "b.json", SYSTEM2);
    let out = dir.path().join("report.xlsx");

    let output = jrecon()
        .args(["compare", &a, &b, "-p", "a", "-p", "b", "-o", out.to_str().unwrap(), "--no-fail"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"PK"), "xlsx is a zip archive");
    assert!(stderr(&output).contains("wrote "));
}

#[test]
fn compare_xlsx_to_stdout_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);

    let output = jrecon()
        .args(["compare", &a, &a, "-p", "a", "--format", "xlsx"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn compare_html_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let b = write(dir.path(), "b.json", SYSTEM2);

    let output = jrecon()
        .args(["compare", &a, &b, "-p", "a", "--format", "html", "--no-fail"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<!DOCTYPE html>"));
    assert!(stdout.contains("#FFFF00"));
}

#[test]
fn compare_without_paths_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);

    let output = jrecon().args(["compare", &a, &a]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no attribute paths"));
}

#[test]
fn compare_comments_need_flag() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", "// export\n{\"X.1\": {\"a\": 1}}\n");

    let output = jrecon().args(["compare", &a, &a, "-p", "a"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("source1: input is not valid JSON"));
    assert!(output.stdout.is_empty());

    let output = jrecon()
        .args(["compare", &a, &a, "-p", "a", "--strip-comments"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[test]
fn compare_wrong_shape_exits_four() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let b = write(dir.path(), "b.json", "[1, 2, 3]");

    let output = jrecon().args(["compare", &a, &b, "-p", "a", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("source2: input must be a mapping"));
    assert!(output.stdout.is_empty(), "no partial report");
}

#[test]
fn compare_size_limit_exits_four() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);

    let output = jrecon()
        .args(["compare", &a, &a, "-p", "a", "--max-input-bytes", "8"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn compare_missing_file_exits_six() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.json", SYSTEM1);
    let missing = dir.path().join("missing.json");

    let output = jrecon()
        .args(["compare", &a, missing.to_str().unwrap(), "-p", "a"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}

// ===========================================================================
// jrecon run / validate
// ===========================================================================

fn write_config(dir: &Path, extra: &str) -> String {
    write(dir, "system1.json", SYSTEM1);
    write(dir, "system2.json", SYSTEM2);
    write(
        dir,
        "test.recon.toml",
        &format!(
            r#"
name = "CLI test"
paths = ["a", "b"]

[sources.source1]
label = "System1"
file = "system1.json"

[sources.source2]
label = "System2"
file = "system2.json"
{extra}"#
        ),
    )
}

#[test]
fn run_resolves_files_and_writes_configured_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "\n[output]\njson = \"out.json\"\nhtml = \"out.html\"\nxlsx = \"out.xlsx\"\n");

    let output = jrecon().args(["run", &config, "--json"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr(&output));
    let report = single_json(&output);
    assert_eq!(report["meta"]["name"], "CLI test");
    assert_eq!(report["summary"]["only_source1"], 1);
    assert_eq!(report["summary"]["only_source2"], 1);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(written["entries"], report["entries"]);
    assert!(dir.path().join("out.html").exists());
    assert!(dir.path().join("out.xlsx").exists());
}

#[test]
fn run_invalid_config_exits_five() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "bad.recon.toml", "name = \"x\"\npaths = []\n");

    let output = jrecon().args(["run", &config]).output().unwrap();
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = jrecon().args(["validate", &config]).output().unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("compares 2 path(s)"));
}
