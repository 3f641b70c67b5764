//! Tests for the `refine` client against a stand-in proxy server.
//!
//! Every test keeps its history and share link in a temporary `--data-dir`.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_cmd::Command;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A proxy that answers every refine with `Refined: <text>`.
struct FakeProxy {
    url: String,
    hits: Arc<AtomicUsize>,
}

impl FakeProxy {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn refine(State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let text = body["text"].as_str().unwrap_or_default();
    Json(json!({
        "refinedPrompt": format!("Refined: {text}"),
        "usage": {"prompt_tokens": 3, "completion_tokens": 2}
    }))
}

/// Serve the fake proxy on its own runtime thread; it lives until the test
/// binary exits.
fn spawn_fake_proxy() -> FakeProxy {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.set_nonblocking(true).expect("nonblocking");
    let addr = listener.local_addr().expect("addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
            let router = Router::new()
                .route("/refine", post(refine))
                .route("/api/refine", post(refine))
                .with_state(counter);
            axum::serve(listener, router).await.expect("serve");
        });
    });

    FakeProxy {
        url: format!("http://{addr}"),
        hits,
    }
}

/// Get a Command instance for the refine binary
#[allow(deprecated)]
fn refine_cmd() -> Command {
    let mut cmd = Command::cargo_bin("refine").expect("Failed to find refine binary");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn seed_history(dir: &Path, entries: Value) {
    fs::write(dir.join("promptHistory.json"), entries.to_string()).expect("write history");
}

fn stored_history(dir: &Path) -> Vec<Value> {
    let content = fs::read_to_string(dir.join("promptHistory.json")).expect("history file");
    serde_json::from_str(&content).expect("history json")
}

#[test]
fn test_refine_records_history_and_share_link() {
    let proxy = spawn_fake_proxy();
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .args(["--server", proxy.url.as_str(), "--no-copy", "--data-dir"])
        .arg(data.path())
        .arg("make it better")
        .assert()
        .success()
        .stdout(predicate::str::contains("Refined: make it better"))
        .stderr(predicate::str::contains("Share:"))
        .stderr(predicate::str::contains("Copied!").not());

    assert_eq!(proxy.hits(), 1);
    let history = stored_history(data.path());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["input"], "make it better");
    assert_eq!(history[0]["output"], "Refined: make it better");

    let link = fs::read_to_string(data.path().join("current_link")).expect("link file");
    assert!(link.contains("input=make+it+better"));
}

#[test]
fn test_refine_reads_stdin() {
    let proxy = spawn_fake_proxy();
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .args(["--server", proxy.url.as_str(), "--no-copy", "--data-dir"])
        .arg(data.path())
        .write_stdin("from a pipe")
        .assert()
        .success()
        .stdout(predicate::str::contains("Refined: from a pipe"));
}

#[test]
fn test_server_with_path_prefix() {
    let proxy = spawn_fake_proxy();
    let data = TempDir::new().expect("temp dir");

    let server = format!("{}/api", proxy.url);

    refine_cmd()
        .args(["--server", server.as_str(), "--no-copy", "--data-dir"])
        .arg(data.path())
        .arg("prefixed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Refined: prefixed"));
}

#[test]
fn test_history_after_options_lists_newest_first() {
    let proxy = spawn_fake_proxy();
    let data = TempDir::new().expect("temp dir");
    seed_history(
        data.path(),
        json!([
            {"input": "first", "output": "one"},
            {"input": "second", "output": "two"},
            {"input": "third", "output": "three"}
        ]),
    );

    let output = refine_cmd()
        .args(["--server", proxy.url.as_str(), "--data-dir"])
        .arg(data.path())
        .args(["history", "--limit", "2", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    let listed: Vec<Value> = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["input"], "third");
    assert_eq!(listed[1]["input"], "second");
    assert_eq!(proxy.hits(), 0);
    assert_eq!(stored_history(data.path()).len(), 3);
}

#[test]
fn test_history_text_output() {
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .arg("--data-dir")
        .arg(data.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No history yet"));

    seed_history(data.path(), json!([{"input": "rough idea", "output": "Clear prompt"}]));

    refine_cmd()
        .arg("--data-dir")
        .arg(data.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("rough idea"))
        .stdout(predicate::str::contains("Clear prompt"));
}

#[test]
fn test_copy_with_nothing_stored_fails_without_refining() {
    let proxy = spawn_fake_proxy();
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .args(["--server", proxy.url.as_str(), "--data-dir"])
        .arg(data.path())
        .arg("copy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to copy yet"));

    assert_eq!(proxy.hits(), 0);
    assert!(!data.path().join("promptHistory.json").exists());
}

#[test]
fn test_open_restores_view_and_records_link() {
    let data = TempDir::new().expect("temp dir");
    let link = "http://127.0.0.1:3000/?input=the+cat+sat&output=the+dog+sat";

    refine_cmd()
        .arg("--data-dir")
        .arg(data.path())
        .args(["open", link, "--diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("the cat sat"))
        .stdout(predicate::str::contains("the dog sat"))
        .stdout(predicate::str::contains("Changes"));

    let recorded = fs::read_to_string(data.path().join("current_link")).expect("link file");
    assert_eq!(recorded, link);
}

#[test]
fn test_open_rejects_invalid_link() {
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .arg("--data-dir")
        .arg(data.path())
        .args(["open", "not a link"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid share link"));
}

#[test]
fn test_unreachable_server_reports_retry_message() {
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .args(["--server", "http://127.0.0.1:9", "--no-copy", "--data-dir"])
        .arg(data.path())
        .arg("anything")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to refine prompt. Please try again."));

    assert!(!data.path().join("promptHistory.json").exists());
}

#[test]
fn test_blank_input_is_rejected() {
    let proxy = spawn_fake_proxy();
    let data = TempDir::new().expect("temp dir");

    refine_cmd()
        .args(["--server", proxy.url.as_str(), "--data-dir"])
        .arg(data.path())
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to refine"));

    assert_eq!(proxy.hits(), 0);
}
