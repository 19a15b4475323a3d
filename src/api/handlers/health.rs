//! Health check endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::app::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub uptime: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "Ollama relay API is running" }))
}

/// GET /api/health
///
/// 200 when the runtime answers its listing command, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.coordinator.runtime_health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                message: "Server is running and Ollama is available".to_string(),
                uptime: state.uptime_seconds(),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "error".to_string(),
                message: "Ollama service is not available".to_string(),
                uptime: state.uptime_seconds(),
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}
