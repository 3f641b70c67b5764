//! Tests for the offline `estimate` and `diff` subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a Command instance for the prompt-refiner binary, isolated from any
/// configuration in the working directory or environment.
#[allow(deprecated)]
fn refiner_cmd(dir: &TempDir) -> Command {
    let mut cmd =
        Command::cargo_bin("prompt-refiner").expect("Failed to find prompt-refiner binary");
    cmd.current_dir(dir.path())
        .env_remove("PROMPT_REFINER_PRICING__INPUT_PER_MILLION")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_estimate_prints_tokens_and_cost() {
    let dir = TempDir::new().expect("temp dir");
    refiner_cmd(&dir)
        .args(["estimate", "Summarise the attached meeting notes."])
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens ≈$"));
}

#[test]
fn test_estimate_json_from_stdin() {
    let dir = TempDir::new().expect("temp dir");
    let output = refiner_cmd(&dir)
        .args(["estimate", "--json"])
        .write_stdin("hello world")
        .output()
        .expect("run");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert!(value["tokens"].as_u64().expect("tokens") > 0);
    assert!(value["costUsd"].as_f64().expect("cost") > 0.0);
}

#[test]
fn test_estimate_empty_is_zero() {
    let dir = TempDir::new().expect("temp dir");
    refiner_cmd(&dir)
        .args(["estimate", "--json", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tokens":0"#));
}

#[test]
fn test_estimate_uses_configured_pricing() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("prompt-refiner.toml"),
        "[pricing]\ninput_per_million = 0.0\noutput_per_million = 0.0\n",
    )
    .expect("write config");

    refiner_cmd(&dir)
        .args(["estimate", "--json", "hello world"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""costUsd":0.0"#));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().expect("temp dir");
    refiner_cmd(&dir)
        .args(["--config", "nope.toml", "estimate", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_diff_plain_format() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("a.txt"), "the cat sat").expect("write");
    fs::write(dir.path().join("b.txt"), "the dog sat").expect("write");

    refiner_cmd(&dir)
        .args(["diff", "a.txt", "b.txt", "--format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("the [-cat-]{+dog+} sat"));
}

#[test]
fn test_diff_json_format() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("a.txt"), "keep this").expect("write");
    fs::write(dir.path().join("b.txt"), "keep this").expect("write");

    let output = refiner_cmd(&dir)
        .args(["diff", "a.txt", "b.txt", "--format", "json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(
        value,
        serde_json::json!({"segments": [{"kind": "unchanged", "text": "keep this"}]})
    );
}

#[test]
fn test_diff_missing_file_fails() {
    let dir = TempDir::new().expect("temp dir");
    refiner_cmd(&dir)
        .args(["diff", "missing.txt", "also-missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
