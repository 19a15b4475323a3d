//! API error types and handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::FailureKind;
use crate::utils::{GenerationError, InstallError, RuntimeError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Ollama service is not available: {0}")]
    Unavailable(#[from] RuntimeError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::BadRequest(_) => FailureKind::BadRequest,
            ApiError::Unavailable(_) => FailureKind::Runtime,
            ApiError::Install(_) => FailureKind::InstallFailed,
            ApiError::Generation(GenerationError::Timeout(_)) => FailureKind::Timeout,
            ApiError::Generation(_) => FailureKind::Runtime,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => status_for(self.kind()),
        }
    }
}

/// HTTP status for a failed chat request
pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::BadRequest => StatusCode::BAD_REQUEST,
        FailureKind::InstallFailed => StatusCode::INTERNAL_SERVER_ERROR,
        FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::Runtime => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("missing field".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GenerationError::Timeout(Duration::from_secs(60))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(GenerationError::Runtime("boom".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(InstallError::WorkerGone).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(RuntimeError::Spawn {
                command: "ollama list".into(),
                reason: "not found".into(),
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
