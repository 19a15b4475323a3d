use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::constants::COMMAND_TIMEOUT_SECS;
use crate::models::{InstalledModel, ModelId, ModelRegistry};
use crate::utils::RuntimeError;

/// Check if the Ollama binary is on PATH
pub fn is_installed(binary: &str) -> bool {
    which::which(binary).is_ok()
}

/// Registry backed by the `ollama list` command
#[derive(Debug, Clone)]
pub struct OllamaCli {
    binary: String,
    timeout: Duration,
}

impl OllamaCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(COMMAND_TIMEOUT_SECS),
        }
    }

    async fn run_list(&self) -> Result<String, RuntimeError> {
        let command = format!("{} list", self.binary);
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary).arg("list").kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| RuntimeError::Spawn {
            command: command.clone(),
            reason: format!("timed out after {:?}", self.timeout),
        })?
        .map_err(|e| RuntimeError::Spawn {
            command: command.clone(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::Exit {
                command,
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

#[async_trait]
impl ModelRegistry for OllamaCli {
    async fn list_names(&self) -> Result<Vec<String>, RuntimeError> {
        let listing = self.run_list().await?;
        Ok(parse_names(&listing))
    }

    async fn list_installed(&self) -> Result<Vec<InstalledModel>, RuntimeError> {
        let listing = self.run_list().await?;
        let models = parse_listing(&listing);
        debug!("Runtime reports {} installed models", models.len());
        Ok(models)
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        self.run_list().await.map(|_| ())
    }
}

/// Parse the tabular output of `ollama list`.
///
/// The first line is a header. Each row is `name size modified...`; the
/// modified column may contain spaces and is rejoined with single spaces.
/// Rows with fewer than three fields are skipped.
pub fn parse_listing(listing: &str) -> Vec<InstalledModel> {
    listing
        .lines()
        .skip(1) // Skip header line
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return None;
            }
            Some(InstalledModel {
                name: fields[0].to_string(),
                size: fields[1].to_string(),
                modified: fields[2..].join(" "),
            })
        })
        .collect()
}

/// First column of every non-empty row after the header
pub fn parse_names(listing: &str) -> Vec<String> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Whether `model` is installed, keeping runtime failures visible
pub async fn check_installed(
    registry: &dyn ModelRegistry,
    model: &ModelId,
) -> Result<bool, RuntimeError> {
    let installed = registry.list_names().await?;
    Ok(installed.iter().any(|name| model.matches_installed(name)))
}

/// Whether `model` is installed; an unreachable runtime counts as "no"
pub async fn model_installed(registry: &dyn ModelRegistry, model: &ModelId) -> bool {
    match check_installed(registry, model).await {
        Ok(installed) => installed,
        Err(e) => {
            warn!("Error checking installed models: {}", e);
            false
        }
    }
}
