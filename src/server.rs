use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{ApiCallResponse, ApiError, ApiFunctionsResponse, ApiHealthResponse};
use meme_scout::dispatch::{dispatch, function_specs, CallEnvelope};
use meme_scout::{Analyzer, ScoutError};

#[derive(Clone)]
struct AppState {
    analyzer: Arc<Analyzer>,
}

pub fn router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/functions", get(functions))
        .route("/api/call", post(call_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { analyzer })
}

pub async fn serve(analyzer: Arc<Analyzer>, host: &str, port: u16) -> Result<(), String> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| format!("failed to bind server: {}", err))?;
    info!(%addr, "meme-scout listening");

    axum::serve(listener, router(analyzer))
        .await
        .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> Json<ApiHealthResponse> {
    Json(ApiHealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn functions() -> Json<ApiFunctionsResponse> {
    Json(ApiFunctionsResponse {
        functions: function_specs(),
    })
}

async fn call_handler(
    State(state): State<AppState>,
    payload: Result<Json<CallEnvelope>, JsonRejection>,
) -> Result<Json<ApiCallResponse>, ApiError> {
    let Json(envelope) =
        payload.map_err(|err| ScoutError::InvalidInput(format!("malformed call envelope: {}", err)))?;
    let name = envelope.name.clone();
    let result = dispatch(&state.analyzer, envelope).await?;
    info!(function = %name, "call complete");
    Ok(Json(ApiCallResponse { result }))
}
