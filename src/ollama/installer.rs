use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::{InstallReport, InstallRoute, ModelId, ModelInstaller};
use crate::utils::InstallError;

/// Installs models with the hardware-aware pull script, falling back to
/// a plain `ollama pull` when the script fails
#[derive(Debug, Clone)]
pub struct ScriptInstaller {
    binary: String,
    script: PathBuf,
    timeout: Duration,
}

enum RouteFailure {
    Cancelled,
    Failed(String),
}

impl ScriptInstaller {
    pub fn new(binary: impl Into<String>, script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            script: script.into(),
            timeout,
        }
    }

    /// Run one install route, capturing stdout and stderr together
    async fn run_route(
        &self,
        mut command: Command,
        cancel: &CancellationToken,
    ) -> Result<String, RouteFailure> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future kills the child
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RouteFailure::Cancelled),
            result = tokio::time::timeout(self.timeout, command.output()) => result,
        };

        let output = match output {
            Err(_) => {
                return Err(RouteFailure::Failed(format!(
                    "timed out after {:?}",
                    self.timeout
                )))
            }
            Ok(Err(e)) => return Err(RouteFailure::Failed(format!("failed to start: {}", e))),
            Ok(Ok(output)) => output,
        };

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if output.status.success() {
            Ok(combined)
        } else {
            Err(RouteFailure::Failed(format!(
                "{}: {}",
                output.status,
                combined.trim()
            )))
        }
    }
}

#[async_trait]
impl ModelInstaller for ScriptInstaller {
    async fn install(
        &self,
        model: &ModelId,
        cancel: CancellationToken,
    ) -> Result<InstallReport, InstallError> {
        info!("Attempting to pull model: {}", model);

        let mut script = Command::new("bash");
        script.arg(&self.script).arg(model.as_str());

        let primary = match self.run_route(script, &cancel).await {
            Ok(output) => {
                info!("Successfully pulled model {} with installer script", model);
                return Ok(InstallReport {
                    model: model.clone(),
                    route: InstallRoute::Script,
                    output,
                });
            }
            Err(RouteFailure::Cancelled) => {
                return Err(InstallError::Cancelled {
                    model: model.to_string(),
                })
            }
            Err(RouteFailure::Failed(detail)) => detail,
        };

        warn!("Error pulling model {} with installer script: {}", model, primary);
        info!("Falling back to direct ollama pull...");

        let mut pull = Command::new(&self.binary);
        pull.arg("pull").arg(model.as_str());

        match self.run_route(pull, &cancel).await {
            Ok(output) => {
                info!("Successfully pulled model {}", model);
                Ok(InstallReport {
                    model: model.clone(),
                    route: InstallRoute::Pull,
                    output,
                })
            }
            Err(RouteFailure::Cancelled) => Err(InstallError::Cancelled {
                model: model.to_string(),
            }),
            Err(RouteFailure::Failed(fallback)) => {
                warn!("Fallback also failed for model {}: {}", model, fallback);
                Err(InstallError::Failed {
                    model: model.to_string(),
                    primary,
                    fallback,
                })
            }
        }
    }
}
