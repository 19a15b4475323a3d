//! Model catalog, status and pull endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    api::error::{ApiError, ApiResult},
    app::AppState,
    models::{InstallRoute, InstalledModel, ModelId, ModelStatus},
};

/// Advertised models and the session model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub available_models: Vec<ModelId>,
    pub current_model: ModelId,
}

/// Install state of every advertised model
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatusResponse {
    pub models: Vec<ModelStatus>,
    pub current_model: ModelId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub model_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PullResponse {
    pub status: String,
    pub message: String,
    /// Output of the install route that succeeded
    pub details: String,
    pub route: InstallRoute,
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    Json(ModelInfoResponse {
        available_models: state.coordinator.available_models(),
        current_model: state.coordinator.current_model(),
    })
}

/// GET /api/models/installed-models
pub async fn installed_models(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<InstalledModel>>> {
    let models = state.coordinator.installed_models().await?;
    Ok(Json(models))
}

/// GET /api/models/status
pub async fn model_status(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    Json(ModelStatusResponse {
        models: state.coordinator.model_statuses().await,
        current_model: state.coordinator.current_model(),
    })
}

/// POST /api/models/pull
pub async fn pull_model(
    State(state): State<AppState>,
    payload: Result<Json<PullRequest>, JsonRejection>,
) -> ApiResult<Json<PullResponse>> {
    let Json(request) = payload?;
    let model = ModelId::from_request(Some(&request.model_name))
        .ok_or_else(|| ApiError::BadRequest("model_name must not be empty".to_string()))?;

    info!("Pull requested for {}", model);
    let report = state.coordinator.pull(model.clone()).await?;

    Ok(Json(PullResponse {
        status: "success".to_string(),
        message: format!("Successfully pulled model {}", model),
        details: report.output,
        route: report.route,
    }))
}
