use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::identifier::ModelId;
use crate::utils::{GenerationError, InstallError};

/// One row of the runtime's installed-model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub modified: String,
}

/// Installed flag for one catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub name: ModelId,
    pub installed: bool,
}

/// A chat message from a client, optionally naming the model to use.
///
/// Older clients send `model` instead of `model_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, alias = "model", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, model_name: Option<&str>) -> Self {
        Self {
            message: message.into(),
            model_name: model_name.map(str::to_string),
        }
    }

    /// The model this request asks for, if any
    pub fn requested_model(&self) -> Option<ModelId> {
        ModelId::from_request(self.model_name.as_deref())
    }
}

/// Which route ended up installing a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallRoute {
    /// Hardware-aware installer script
    Script,
    /// Plain `ollama pull`
    Pull,
}

/// Successful install with the output of the route that worked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub model: ModelId,
    pub route: InstallRoute,
    pub output: String,
}

/// Model the coordinator settled on for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveModel {
    pub model: ModelId,
    /// True if the model had to be installed first
    pub pulled: bool,
}

/// Progress emitted while a request waits on a model switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    Installing(ModelId),
    Installed(ModelId),
    InstallFailed { model: ModelId, message: String },
}

/// Callback receiving install progress for one request
pub type ProgressCallback = Arc<dyn Fn(ModelEvent) + Send + Sync>;

/// Why a chat request produced no text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    BadRequest,
    InstallFailed,
    Timeout,
    Runtime,
}

/// Result of a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatOutcome {
    Ready {
        model: ModelId,
        response: String,
        pulled: bool,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl ChatOutcome {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        ChatOutcome::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ChatOutcome::Ready { .. })
    }
}

impl From<InstallError> for ChatOutcome {
    fn from(err: InstallError) -> Self {
        ChatOutcome::failed(FailureKind::InstallFailed, err.to_string())
    }
}

impl From<GenerationError> for ChatOutcome {
    fn from(err: GenerationError) -> Self {
        let kind = match err {
            GenerationError::Timeout(_) => FailureKind::Timeout,
            GenerationError::Runtime(_) | GenerationError::Connection(_) => FailureKind::Runtime,
        };
        ChatOutcome::failed(kind, err.to_string())
    }
}
