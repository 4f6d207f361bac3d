//! Integration tests for the `vela` binary.
//!
//! Each test runs the built executable against the fixtures under
//! `tests/fixtures` and checks its exit status and output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn vela(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vela"))
        .args(args)
        .arg("--color")
        .arg("never")
        .current_dir(dir)
        .env_remove("VELA_LOG")
        .output()
        .expect("failed to run vela")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Test 1: Check a project
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_check_project_with_discovered_config() {
    let output = vela(&["check", "src"], &fixtures_dir().join("project"));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Checked 2 files: no problems found"));
}

#[test]
fn test_check_needs_custom_keywords_from_config() {
    let project = fixtures_dir().join("project");
    let src = project.join("src");
    let src = src.to_str().unwrap();

    let without = vela(&["check", src], &fixtures_dir());
    assert_eq!(without.status.code(), Some(1));

    let config = project.join("vela.toml");
    let with = vela(&["check", src, "--config", config.to_str().unwrap()], &fixtures_dir());
    assert!(with.status.success(), "stderr: {}", stderr(&with));
}

#[test]
fn test_check_reports_errors() {
    let output = vela(&["check", "broken"], &fixtures_dir());
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("E0202"), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Checked 1 file: "));
}

#[test]
fn test_check_json_output() {
    let output = vela(&["check", "broken", "--json"], &fixtures_dir());
    assert_eq!(output.status.code(), Some(1));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0]["file"].as_str().unwrap().ends_with("bad.vela"));

    let first = &reports[0]["diagnostics"][0];
    assert_eq!(first["code"], "E0202");
    assert_eq!(first["severity"], "error");
    assert_eq!(first["start_line"], 1);
}

#[test]
fn test_check_missing_path_fails() {
    let output = vela(&["check", "no-such-dir"], &fixtures_dir());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no-such-dir"));
}

// ────────────────────────────────────────────────────────────────────────────
// Test 2: Lex and parse single sources
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_lex_inline_code_as_json() {
    let output = vela(&["lex", "-e", "total = 1 # note", "--json"], &fixtures_dir());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["origin"], "<code>");
    let kinds: Vec<&str> = report["tokens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["kind"].as_str().unwrap())
        .collect();
    assert_eq!(&kinds[..3], ["Identifier", "Equals", "Number"]);
    assert!(!kinds.contains(&"Comment"));
}

#[test]
fn test_lex_text_output_lists_tokens() {
    let output = vela(&["lex", "-e", "if ready"], &fixtures_dir());
    assert!(output.status.success());
    let text = stdout(&output);
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("1:1-1:3"), "{}", first);
    assert!(first.contains("If"));
    assert!(text.contains("\"ready\""));
}

#[test]
fn test_parse_print_normalizes_source() {
    let output = vela(&["parse", "-e", "x   =   a+b*c", "--print"], &fixtures_dir());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "x = a + b * c");
}

#[test]
fn test_parse_tree_dump() {
    let output = vela(&["parse", "-e", "y = f(1)"], &fixtures_dir());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Scope [y]"), "{}", text);
    assert!(text.contains("items[0]: VarDef"));
    assert!(text.contains("target: Name f"));
}

#[test]
fn test_parse_json_has_root_and_diagnostics() {
    let output = vela(&["parse", "-e", "x = (", "--json"], &fixtures_dir());
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["root"].is_u64());
    assert!(report["ast"]["nodes"].as_array().unwrap().len() > 1);
    assert!(!report["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn test_parse_file_from_fixture() {
    let path = fixtures_dir().join("project/src/shapes/point.vela");
    let output = vela(&["parse", path.to_str().unwrap(), "--print"], &fixtures_dir());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("class Point(Shape)"));
}

// ────────────────────────────────────────────────────────────────────────────
// Test 3: Configuration
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_shows_loaded_file() {
    let output = vela(&["config"], &fixtures_dir().join("project"));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("# from vela.toml"), "{}", text);
    assert!(text.contains("[syntax]"));
    assert!(text.contains("\"repeat\""));
}

#[test]
fn test_config_defaults() {
    let output = vela(&["config"], &fixtures_dir());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("# defaults"));
    assert!(text.contains("max_depth = 48"));
}

#[test]
fn test_invalid_config_is_reported() {
    let output = vela(&["config", "--config", "missing.toml"], &fixtures_dir());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing.toml"));
}
