use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::app::Config;
use crate::models::{ModelCatalog, ModelId, ModelInstaller, ModelRegistry, TextGenerator};
use crate::ollama::{InstallWorker, OllamaCli, OllamaClient, ScriptInstaller};
use crate::session::ModelSessionCoordinator;

/// Global application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Config>,
    /// Model switching, installs and generation
    pub coordinator: Arc<ModelSessionCoordinator>,
    /// Fired on shutdown; stops the install worker
    pub shutdown: CancellationToken,
    /// Server start time for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    /// Wire the relay to the Ollama runtime described by `config`
    pub fn from_config(config: Config) -> Self {
        let registry = Arc::new(OllamaCli::new(&config.ollama.binary));
        let installer = Arc::new(ScriptInstaller::new(
            &config.ollama.binary,
            &config.ollama.installer_script,
            config.ollama.install_timeout(),
        ));
        let generator = Arc::new(OllamaClient::new(
            &config.ollama.url,
            config.generation.temperature,
        ));

        Self::new(config, registry, installer, generator)
    }

    /// Create app state from explicit collaborators. Must run inside a tokio
    /// runtime since it starts the install worker.
    pub fn new(
        config: Config,
        registry: Arc<dyn ModelRegistry>,
        installer: Arc<dyn ModelInstaller>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let catalog = Arc::new(ModelCatalog::new(config.catalog.models.iter().map(String::as_str)));
        let installs =
            InstallWorker::spawn(installer, Arc::clone(&catalog), shutdown.child_token());

        let coordinator = ModelSessionCoordinator::new(
            ModelId::new(config.generation.default_model.as_str()),
            catalog,
            registry,
            installs,
            generator,
            config.generation.timeout(),
        );

        Self {
            config: Arc::new(config),
            coordinator: Arc::new(coordinator),
            shutdown,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
