use std::time::Duration;

use thiserror::Error;

/// Main error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Failures talking to the runtime's listing/liveness command
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("Failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` exited with {status}: {output}")]
    Exit {
        command: String,
        status: String,
        output: String,
    },
}

/// Failures of a model installation
#[derive(Error, Debug, Clone)]
pub enum InstallError {
    #[error("Failed to pull model {model}: installer script: {primary}; ollama pull: {fallback}")]
    Failed {
        model: String,
        primary: String,
        fallback: String,
    },

    #[error("Install of {model} was cancelled")]
    Cancelled { model: String },

    #[error("Install worker is not running")]
    WorkerGone,
}

/// Failures of a single generation call
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Failed to reach the model runtime: {0}")]
    Connection(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_request() {
            GenerationError::Connection(err.to_string())
        } else {
            GenerationError::Runtime(err.to_string())
        }
    }
}
