//! Integration tests for the CDL CLI
//!
//! These tests invoke the actual cdl binary and verify:
//! - Exit codes (0 = success, 1 = grammar violation, 2 = error)
//! - stdout/stderr output
//! - JSON output format

use std::path::PathBuf;
use std::process::Command;

// ── Helpers ───────────────────────────────────────────────

fn cdl_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cdl"))
}

fn fixture_valid(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(format!("../../tests/fixtures/valid/{}", name))
}

fn fixture_invalid(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(format!("../../tests/fixtures/invalid/{}", name))
}

fn run_cdl(args: &[&str]) -> std::process::Output {
    Command::new(cdl_bin())
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to execute cdl")
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run_cdl(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cdl"), "should contain 'cdl'");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "should contain version"
    );
}

#[test]
fn test_version_flag() {
    let output = run_cdl(&["--version"]);
    assert!(output.status.success(), "--version should exit 0");
}

// ── Parse ─────────────────────────────────────────────────

#[test]
fn test_parse_valid_contract() {
    let file = fixture_valid("vehicle.cdl");
    let output = run_cdl(&["parse", file.to_str().unwrap()]);
    assert!(output.status.success(), "parse should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Vehicle"));
    assert!(stdout.contains("VehicleBase"));
    assert!(stdout.contains("SetSpeed"));
}

#[test]
fn test_parse_valid_contract_json() {
    let file = fixture_valid("vehicle.cdl");
    let output = run_cdl(&["parse", file.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "parse --json should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);

    let tree: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    let contract = &tree[0]["Contract"];
    assert_eq!(contract["name"], "Vehicle");
    assert_eq!(contract["base_name"], "VehicleBase");
    assert_eq!(contract["members"].as_array().unwrap().len(), 6);
}

#[test]
fn test_parse_empty_contract() {
    let file = fixture_valid("empty.cdl");
    let output = run_cdl(&["parse", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Empty"));
}

#[test]
fn test_parse_invalid_contract_exits_1() {
    let file = fixture_invalid("missing_colon.cdl");
    let output = run_cdl(&["parse", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1), "grammar violation should exit 1");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error (token"), "should name the token index");
    assert!(stderr.contains("colon"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.is_empty(), "no partial tree on failure");
}

#[test]
fn test_parse_unknown_keyword_exits_1() {
    let file = fixture_invalid("unknown_keyword.cdl");
    let output = run_cdl(&["parse", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown keyword 'interface'"));
}

#[test]
fn test_parse_missing_file_exits_2() {
    let output = run_cdl(&["parse", "no_such_file.cdl"]);
    assert_eq!(output.status.code(), Some(2), "I/O failure should exit 2");
}

#[test]
fn test_parse_debug_trace_goes_to_stderr() {
    let file = fixture_valid("vehicle.cdl");
    let output = run_cdl(&["parse", file.to_str().unwrap(), "--debug"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG:"));
    assert!(stderr.contains("Defining contract 'Vehicle'"));
}

// ── Check ─────────────────────────────────────────────────

#[test]
fn test_check_valid_contract() {
    let file = fixture_valid("vehicle.cdl");
    let output = run_cdl(&["check", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok:"));
    assert!(stdout.contains("1 contract"));
}

#[test]
fn test_check_invalid_contract_exits_1() {
    let file = fixture_invalid("missing_colon.cdl");
    let output = run_cdl(&["check", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}

// ── Tokens ────────────────────────────────────────────────

#[test]
fn test_tokens_dump() {
    let file = fixture_valid("empty.cdl");
    let output = run_cdl(&["tokens", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "0: ID : \"contract\"\n\
         1: ID : \"Empty\"\n\
         2: Other : \":\"\n\
         3: ID : \"EmptyBase\"\n\
         4: Other : \"{\"\n\
         5: Other : \"}\"\n\
         6: Other : \";\"\n"
    );
}

#[test]
fn test_tokens_dump_works_on_invalid_grammar() {
    // The dump is a lexical view; grammar violations do not affect it.
    let file = fixture_invalid("unknown_keyword.cdl");
    let output = run_cdl(&["tokens", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0: ID : \"interface\""));
}
