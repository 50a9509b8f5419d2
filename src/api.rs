use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use meme_scout::dispatch::FunctionSpec;
use meme_scout::ScoutError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallResponse {
    pub result: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ApiFunctionsResponse {
    pub functions: Vec<FunctionSpec>,
}

#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Renders a service error as the `{error}` envelope.
pub struct ApiError(pub ScoutError);

impl From<ScoutError> for ApiError {
    fn from(err: ScoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "call failed");
        }
        let body = ApiErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
