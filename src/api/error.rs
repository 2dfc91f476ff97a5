use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures the chat endpoint reports to its caller. Everything else in the
/// process either aborts startup or never crosses the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    /// Prompt was empty after trimming; generation was never invoked.
    EmptyPrompt,
    /// The generation capability failed; carries the underlying cause.
    Inference(anyhow::Error),
}

impl ApiError {
    pub fn parts(self) -> (StatusCode, String) {
        match self {
            ApiError::EmptyPrompt => (
                StatusCode::BAD_REQUEST,
                "Prompt cannot be empty.".to_string(),
            ),
            ApiError::Inference(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.parts();
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
