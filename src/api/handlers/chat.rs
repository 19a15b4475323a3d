//! Request/response chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::error::{status_for, ApiResult},
    app::AppState,
    models::{ChatOutcome, ChatRequest},
};

/// POST /api/chat
///
/// Installs the requested model first when needed, then answers with a
/// single tagged body: `ready` with the text or `error` with a kind.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let outcome = state.coordinator.chat(request, None).await;

    let status = match &outcome {
        ChatOutcome::Ready { .. } => StatusCode::OK,
        ChatOutcome::Error { kind, .. } => status_for(*kind),
    };

    Ok((status, Json(outcome)).into_response())
}
