use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::identifier::ModelId;
use super::types::{InstallReport, InstalledModel};
use crate::utils::{GenerationError, InstallError, RuntimeError};

/// Read access to the runtime's local model store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Names of installed models, one per listing row; never cached
    async fn list_names(&self) -> Result<Vec<String>, RuntimeError>;

    /// Fresh snapshot of installed models with size and age. Rows the
    /// runtime prints without those columns are left out.
    async fn list_installed(&self) -> Result<Vec<InstalledModel>, RuntimeError>;

    /// Check that the runtime answers at all
    async fn ping(&self) -> Result<(), RuntimeError>;
}

/// Something that can fetch a model into the runtime's store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelInstaller: Send + Sync {
    /// Install `model`, giving up when `cancel` fires
    async fn install(
        &self,
        model: &ModelId,
        cancel: CancellationToken,
    ) -> Result<InstallReport, InstallError>;
}

/// Single-shot text generation against an installed model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a full reply to `message`, failing after `timeout`
    async fn generate(
        &self,
        message: &str,
        model: &ModelId,
        timeout: Duration,
    ) -> Result<String, GenerationError>;
}
