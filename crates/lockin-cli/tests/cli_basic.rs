//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Only the
//! fully-local commands are exercised here; collaborator paths are covered
//! by the core crate's mocked tests.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "lockin-cli", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn evaluate_allows_a_strong_session() {
    let (stdout, stderr, code) = run_cli(&[
        "evaluate",
        "--goal-minutes",
        "60",
        "--elapsed-seconds",
        "2880",
        "--focused-seconds",
        "2592",
        "--violations",
        "2",
    ]);
    assert_eq!(code, 0, "evaluate failed: {stderr}");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(parsed["allow"], serde_json::Value::Bool(true));
    assert!(parsed["feedback"].as_str().unwrap().contains("80%"));
}

#[test]
fn evaluate_denies_a_short_unfocused_session() {
    let (stdout, _stderr, code) = run_cli(&[
        "evaluate",
        "--goal-minutes",
        "60",
        "--elapsed-seconds",
        "300",
        "--focused-seconds",
        "90",
        "--violations",
        "6",
    ]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(parsed["allow"], serde_json::Value::Bool(false));
    assert!(!parsed["roast"].as_str().unwrap().is_empty());
}

#[test]
fn define_prints_a_glossary_entry() {
    let (stdout, _stderr, code) = run_cli(&["define", "algorithm"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert!(parsed["summary"].as_str().unwrap().contains("step-by-step"));
}

#[test]
fn local_roast_comes_from_the_canned_list() {
    let (stdout, _stderr, code) = run_cli(&[
        "roast",
        "--elapsed-seconds",
        "600",
        "--focused-seconds",
        "300",
        "--local",
    ]);
    assert_eq!(code, 0);
    assert!(lockin_core::roast::FALLBACK_ROASTS.contains(&stdout.trim()));
}
