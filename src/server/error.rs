use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::refine::RefineError;

/// Error response: a status code and a flat `{ "error": message }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn invalid_input() -> Self {
        Self::from(RefineError::InvalidInput)
    }
}

impl From<RefineError> for ApiError {
    fn from(err: RefineError) -> Self {
        let status = match err {
            RefineError::InvalidInput => StatusCode::BAD_REQUEST,
            RefineError::RefinementFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Display only carries the generic message; the cause stays in the logs.
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
