//! End-to-end tests of `POST /refine` against a fake chat completions API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use prompt_refiner::estimate::TokenEstimator;
use prompt_refiner::refine::{OpenAiProvider, RefineSettings, RefinementProxy, SYSTEM_PROMPT};
use prompt_refiner::server::{create_router, AppState};

/// What the fake upstream saw and how it should answer.
#[derive(Clone)]
struct Upstream {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    status: StatusCode,
    reply: Value,
}

impl Upstream {
    fn answering(reply: Value) -> Self {
        Self {
            requests: Arc::default(),
            status: StatusCode::OK,
            reply,
        }
    }

    fn failing(status: StatusCode) -> Self {
        Self {
            requests: Arc::default(),
            status,
            reply: json!({"error": {"message": "rate limited"}}),
        }
    }

    fn seen(&self) -> Vec<(Option<String>, Value)> {
        self.requests.lock().expect("lock").clone()
    }
}

async fn chat_completions(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    upstream.requests.lock().expect("lock").push((auth, body));
    (upstream.status, Json(upstream.reply.clone()))
}

/// Serve `upstream` on an ephemeral port and return its base URL.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn spawn_upstream(upstream: Upstream) -> String {
    let router = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(upstream);
    format!("{}/v1", spawn(router).await)
}

async fn spawn_proxy(upstream_base: String, api_key: Option<&str>) -> String {
    let provider = OpenAiProvider::new(
        upstream_base,
        api_key.map(str::to_string),
        "TEST_OPENAI_KEY",
        Duration::from_secs(5),
    )
    .expect("provider");
    let proxy = RefinementProxy::new(
        Arc::new(provider),
        RefineSettings::default(),
        Duration::from_secs(5),
    );
    spawn(create_router(AppState::new(proxy, TokenEstimator::default()))).await
}

async fn post_refine(proxy: &str, body: &str) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{proxy}/refine"))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("send");
    let status = StatusCode::from_u16(response.status().as_u16()).expect("status");
    let value = response.json().await.expect("json");
    (status, value)
}

#[tokio::test]
async fn test_refine_round_trip_through_upstream() {
    let upstream = Upstream::answering(json!({
        "choices": [{
            "message": {"role": "assistant", "content": "# Role\nYou are a concise editor."}
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 9, "total_tokens": 129}
    }));
    let proxy = spawn_proxy(spawn_upstream(upstream.clone()).await, Some("sk-test")).await;

    let (status, body) = post_refine(&proxy, r#"{"text":"make this better"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refinedPrompt"], "# Role\nYou are a concise editor.");
    assert_eq!(body["usage"]["total_tokens"], 129);

    let seen = upstream.seen();
    assert_eq!(seen.len(), 1);
    let (auth, request) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(request["model"], "gpt-4o-mini");
    assert_eq!(request["max_tokens"], 2000);
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(request["messages"][0]["content"], SYSTEM_PROMPT);
    assert_eq!(request["messages"][1]["role"], "user");
    assert_eq!(
        request["messages"][1]["content"],
        "Please refine this prompt:\n\nmake this better"
    );
}

#[tokio::test]
async fn test_invalid_input_never_reaches_upstream() {
    let upstream = Upstream::answering(json!({"choices": []}));
    let proxy = spawn_proxy(spawn_upstream(upstream.clone()).await, Some("sk-test")).await;

    let (status, body) = post_refine(&proxy, r#"{"text":""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid input text"}));
    assert!(upstream.seen().is_empty());
}

#[tokio::test]
async fn test_empty_choices_yield_empty_prompt() {
    let upstream = Upstream::answering(json!({"choices": []}));
    let proxy = spawn_proxy(spawn_upstream(upstream).await, Some("sk-test")).await;

    let (status, body) = post_refine(&proxy, r#"{"text":"x"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refinedPrompt"], "");
    assert!(body.get("usage").is_none());
}

#[tokio::test]
async fn test_upstream_error_is_generic_500() {
    let upstream = Upstream::failing(StatusCode::TOO_MANY_REQUESTS);
    let proxy = spawn_proxy(spawn_upstream(upstream).await, Some("sk-test")).await;

    let (status, body) = post_refine(&proxy, r#"{"text":"x"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to refine prompt"}));
}

#[tokio::test]
async fn test_missing_api_key_is_generic_500() {
    let upstream = Upstream::answering(json!({"choices": []}));
    let proxy = spawn_proxy(spawn_upstream(upstream.clone()).await, None).await;

    let (status, body) = post_refine(&proxy, r#"{"text":"x"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to refine prompt");
    assert!(upstream.seen().is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_is_generic_500() {
    // Nothing listens on the discard port.
    let proxy = spawn_proxy("http://127.0.0.1:9/v1".to_string(), Some("sk-test")).await;

    let (status, body) = post_refine(&proxy, r#"{"text":"x"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to refine prompt");
}
