//! API route definitions

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api::{
        handlers::{chat, health, models, ws},
        middleware::logging_middleware,
    },
    app::AppState,
};

/// API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(health::index))
        .route("/api/health", get(health::health_check))
        // Models
        .route("/api/models", get(models::list_models))
        .route("/api/models/installed-models", get(models::installed_models))
        .route("/api/models/status", get(models::model_status))
        .route("/api/models/pull", post(models::pull_model))
        // Chat
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/ws", get(ws::chat_socket))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(logging_middleware))
                // CORS
                .layer(CorsLayer::permissive()),
        )
}

/// Routes bound to their state, ready to serve
pub fn router(state: AppState) -> Router {
    api_routes().with_state(state)
}
