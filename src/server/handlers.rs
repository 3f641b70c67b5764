use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::diff::{diff_words, DiffSegment};
use crate::estimate::CostEstimate;
use crate::refine::UsageMetadata;

/// `POST /refine` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub refined_prompt: String,
    #[serde(default, skip_serializing_if = "UsageMetadata::is_empty")]
    pub usage: UsageMetadata,
}

/// `POST /diff` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffRequest {
    pub original: String,
    pub revised: String,
}

/// `POST /diff` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResponse {
    pub segments: Vec<DiffSegment>,
}

/// Bodies are parsed by hand so that any malformed payload, whatever its
/// content type, maps to the same 400 response.
fn parse_body(body: &Bytes) -> Option<Value> {
    serde_json::from_slice::<Value>(body).ok()
}

pub(super) async fn refine(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RefineResponse>, ApiError> {
    let payload = parse_body(&body);
    let text = payload.as_ref().and_then(|value| value.get("text"));

    let refinement = state.proxy.refine_value(text).await.map_err(|err| {
        tracing::debug!(kind = err.label(), "refine request rejected");
        ApiError::from(err)
    })?;

    Ok(Json(RefineResponse {
        refined_prompt: refinement.refined_text,
        usage: refinement.usage,
    }))
}

pub(super) async fn estimate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CostEstimate>, ApiError> {
    let payload = parse_body(&body).ok_or_else(ApiError::invalid_input)?;
    let Some(text) = payload.get("text").and_then(Value::as_str) else {
        return Err(ApiError::invalid_input());
    };
    Ok(Json(state.estimator.estimate(text)))
}

pub(super) async fn diff(body: Bytes) -> Result<Json<DiffResponse>, ApiError> {
    let request: DiffRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::invalid_input())?;
    Ok(Json(DiffResponse {
        segments: diff_words(&request.original, &request.revised),
    }))
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
