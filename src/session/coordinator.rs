use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::state::SessionState;
use crate::models::{
    ActiveModel, ChatOutcome, ChatRequest, InstallReport, InstalledModel, ModelCatalog,
    ModelEvent, ModelId, ModelRegistry, ModelStatus, ProgressCallback, TextGenerator,
};
use crate::ollama::{model_installed, InstallWorker};
use crate::utils::{InstallError, RuntimeError};

/// Decides which model serves each request, installing it when needed.
///
/// The session lock is only held to read or replace the current model.
/// Probing, installing and generating all run without it, and each request
/// generates with the model resolved for that request even if another
/// request switches the session in the meantime.
pub struct ModelSessionCoordinator {
    session: SessionState,
    catalog: Arc<ModelCatalog>,
    registry: Arc<dyn ModelRegistry>,
    installs: InstallWorker,
    generator: Arc<dyn TextGenerator>,
    generation_timeout: Duration,
}

impl ModelSessionCoordinator {
    pub fn new(
        default_model: ModelId,
        catalog: Arc<ModelCatalog>,
        registry: Arc<dyn ModelRegistry>,
        installs: InstallWorker,
        generator: Arc<dyn TextGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            session: SessionState::new(default_model),
            catalog,
            registry,
            installs,
            generator,
            generation_timeout,
        }
    }

    pub fn current_model(&self) -> ModelId {
        self.session.current_model()
    }

    pub fn available_models(&self) -> Vec<ModelId> {
        self.catalog.snapshot()
    }

    /// Make sure `requested` is installed and current.
    ///
    /// No preference, or the model that is already current, resolves to the
    /// current model without touching the runtime. A failed install leaves
    /// the session untouched.
    pub async fn ensure_model(
        &self,
        requested: Option<ModelId>,
        progress: Option<&ProgressCallback>,
    ) -> Result<ActiveModel, InstallError> {
        let current = self.session.current_model();
        let requested = match requested {
            Some(model) if model != current => model,
            _ => {
                return Ok(ActiveModel {
                    model: current,
                    pulled: false,
                })
            }
        };

        let mut pulled = false;
        if !model_installed(self.registry.as_ref(), &requested).await {
            info!("Model {} not installed, attempting to pull...", requested);
            emit(progress, ModelEvent::Installing(requested.clone()));

            if let Err(e) = self.installs.install(requested.clone()).await {
                emit(
                    progress,
                    ModelEvent::InstallFailed {
                        model: requested.clone(),
                        message: e.to_string(),
                    },
                );
                return Err(e);
            }

            emit(progress, ModelEvent::Installed(requested.clone()));
            pulled = true;
        }

        let previous = self.session.switch_to(requested.clone());
        info!("Switched to model: {} (was {})", requested, previous);

        Ok(ActiveModel {
            model: requested,
            pulled,
        })
    }

    /// Resolve the model for `request` and generate a reply with it
    pub async fn chat(
        &self,
        request: ChatRequest,
        progress: Option<ProgressCallback>,
    ) -> ChatOutcome {
        let active = match self
            .ensure_model(request.requested_model(), progress.as_ref())
            .await
        {
            Ok(active) => active,
            Err(e) => return ChatOutcome::from(e),
        };

        info!("Processing query with model: {}", active.model);
        match self
            .generator
            .generate(&request.message, &active.model, self.generation_timeout)
            .await
        {
            Ok(response) => {
                info!("Got response (length: {})", response.len());
                ChatOutcome::Ready {
                    model: active.model,
                    response,
                    pulled: active.pulled,
                }
            }
            Err(e) => ChatOutcome::from(e),
        }
    }

    /// Install a model without changing the session
    pub async fn pull(&self, model: ModelId) -> Result<InstallReport, InstallError> {
        self.installs.install(model).await
    }

    pub async fn installed_models(&self) -> Result<Vec<InstalledModel>, RuntimeError> {
        self.registry.list_installed().await
    }

    /// Installed flag for every catalog entry, from one fresh listing
    pub async fn model_statuses(&self) -> Vec<ModelStatus> {
        let installed = match self.registry.list_names().await {
            Ok(installed) => installed,
            Err(e) => {
                warn!("Error checking installed models: {}", e);
                Vec::new()
            }
        };

        self.catalog
            .snapshot()
            .into_iter()
            .map(|name| {
                let installed = installed.iter().any(|m| name.matches_installed(m));
                ModelStatus { name, installed }
            })
            .collect()
    }

    pub async fn runtime_health(&self) -> Result<(), RuntimeError> {
        self.registry.ping().await
    }
}

fn emit(progress: Option<&ProgressCallback>, event: ModelEvent) {
    if let Some(callback) = progress {
        callback(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FailureKind, InstallRoute, MockModelInstaller, MockModelRegistry, MockTextGenerator,
    };
    use crate::utils::GenerationError;
    use mockall::predicate::eq;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tokio::task::JoinSet;
    use tokio_util::sync::CancellationToken;

    fn installed(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn registry_with(names: &'static [&'static str]) -> MockModelRegistry {
        let mut registry = MockModelRegistry::new();
        registry
            .expect_list_names()
            .returning(move || Ok(installed(names)));
        registry
    }

    fn echo_generator() -> MockTextGenerator {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(|message, model, _| Ok(format!("{} says: {}", model, message)));
        generator
    }

    fn coordinator(
        registry: MockModelRegistry,
        installer: MockModelInstaller,
        generator: MockTextGenerator,
    ) -> (ModelSessionCoordinator, Arc<ModelCatalog>) {
        let catalog = Arc::new(ModelCatalog::new(["llama3.1:8b", "mistral:7b"]));
        let installs = InstallWorker::spawn(
            Arc::new(installer),
            Arc::clone(&catalog),
            CancellationToken::new(),
        );
        let coordinator = ModelSessionCoordinator::new(
            ModelId::new("llama3.1:8b"),
            Arc::clone(&catalog),
            Arc::new(registry),
            installs,
            Arc::new(generator),
            Duration::from_secs(60),
        );
        (coordinator, catalog)
    }

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<ModelEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback =
            Arc::new(move |event: ModelEvent| sink.lock().push(event));
        (callback, events)
    }

    #[tokio::test]
    async fn test_same_model_skips_probe_and_install() {
        let mut registry = MockModelRegistry::new();
        registry.expect_list_names().never();
        let mut installer = MockModelInstaller::new();
        installer.expect_install().never();
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .withf(|message, model, timeout| {
                message == "hi" && model == "llama3.1:8b" && *timeout == Duration::from_secs(60)
            })
            .times(1)
            .returning(|_, _, _| Ok("hello".into()));

        let (coordinator, _) = coordinator(registry, installer, generator);
        let outcome = coordinator
            .chat(ChatRequest::new("hi", Some("llama3.1:8b")), None)
            .await;

        assert_eq!(
            outcome,
            ChatOutcome::Ready {
                model: ModelId::new("llama3.1:8b"),
                response: "hello".into(),
                pulled: false,
            }
        );
        assert_eq!(coordinator.current_model(), "llama3.1:8b");
    }

    #[tokio::test]
    async fn test_missing_model_name_uses_current() {
        let mut registry = MockModelRegistry::new();
        registry.expect_list_names().never();
        let mut installer = MockModelInstaller::new();
        installer.expect_install().never();

        let (coordinator, _) = coordinator(registry, installer, echo_generator());
        for request in [ChatRequest::new("hi", None), ChatRequest::new("hi", Some(""))] {
            let outcome = coordinator.chat(request, None).await;
            assert!(
                matches!(&outcome, ChatOutcome::Ready { model, .. } if model == "llama3.1:8b")
            );
        }
        assert_eq!(coordinator.current_model(), "llama3.1:8b");
    }

    #[tokio::test]
    async fn test_installed_model_switches_without_install() {
        let mut installer = MockModelInstaller::new();
        installer.expect_install().never();
        let (coordinator, _) = coordinator(
            registry_with(&["llama3.1:8b", "mistral:7b"]),
            installer,
            echo_generator(),
        );
        let (progress, events) = recorder();

        let active = coordinator
            .ensure_model(Some(ModelId::new("mistral:7b")), Some(&progress))
            .await
            .unwrap();

        assert_eq!(
            active,
            ActiveModel {
                model: ModelId::new("mistral:7b"),
                pulled: false,
            }
        );
        assert_eq!(coordinator.current_model(), "mistral:7b");
        assert!(events.lock().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_switches_keep_each_request_model() {
        const MODELS: [&str; 4] = ["a:1", "b:1", "c:1", "d:1"];
        let mut installer = MockModelInstaller::new();
        installer.expect_install().never();
        let (coordinator, _) = coordinator(registry_with(&MODELS), installer, echo_generator());
        let coordinator = Arc::new(coordinator);

        let mut requests = JoinSet::new();
        for i in 0..200 {
            let coordinator = Arc::clone(&coordinator);
            let requested = MODELS[i % MODELS.len()];
            requests.spawn(async move {
                let request = ChatRequest::new(format!("request {}", i), Some(requested));
                (requested, coordinator.chat(request, None).await)
            });
        }

        while let Some(joined) = requests.join_next().await {
            let (requested, outcome) = joined.unwrap();
            match outcome {
                ChatOutcome::Ready {
                    model,
                    response,
                    pulled,
                } => {
                    assert_eq!(model, requested);
                    assert!(response.starts_with(&format!("{} says:", requested)));
                    assert!(!pulled);
                }
                other => panic!("Expected a reply from {}, got {:?}", requested, other),
            }
        }
        assert!(MODELS.contains(&coordinator.current_model().as_str()));
    }

    #[tokio::test]
    async fn test_bare_name_request_matches_tagged_install() {
        let mut installer = MockModelInstaller::new();
        installer.expect_install().never();
        let (coordinator, _) = coordinator(
            registry_with(&["llama3.1:latest"]),
            installer,
            echo_generator(),
        );

        let active = coordinator
            .ensure_model(Some(ModelId::new("llama3.1")), None)
            .await
            .unwrap();
        assert_eq!(active.model, "llama3.1");
        assert!(!active.pulled);
    }

    #[tokio::test]
    async fn test_missing_model_is_installed_then_used() {
        let mut installer = MockModelInstaller::new();
        installer
            .expect_install()
            .with(eq(ModelId::new("phi3:mini")), mockall::predicate::always())
            .times(1)
            .returning(|model, _| {
                Ok(InstallReport {
                    model: model.clone(),
                    route: InstallRoute::Pull,
                    output: "pulling manifest\nsuccess".into(),
                })
            });
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .withf(|_, model, _| model == "phi3:mini")
            .times(1)
            .returning(|_, _, _| Ok("hi from phi".into()));

        let (coordinator, catalog) =
            coordinator(registry_with(&["llama3.1:8b"]), installer, generator);
        let (progress, events) = recorder();

        let outcome = coordinator
            .chat(ChatRequest::new("hi", Some("phi3:mini")), Some(progress))
            .await;

        assert_eq!(
            outcome,
            ChatOutcome::Ready {
                model: ModelId::new("phi3:mini"),
                response: "hi from phi".into(),
                pulled: true,
            }
        );
        assert_eq!(coordinator.current_model(), "phi3:mini");
        assert_eq!(
            catalog
                .snapshot()
                .iter()
                .filter(|m| m.as_str() == "phi3:mini")
                .count(),
            1
        );
        assert_eq!(
            *events.lock(),
            vec![
                ModelEvent::Installing(ModelId::new("phi3:mini")),
                ModelEvent::Installed(ModelId::new("phi3:mini")),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_install_keeps_session() {
        let mut installer = MockModelInstaller::new();
        installer.expect_install().times(1).returning(|model, _| {
            Err(InstallError::Failed {
                model: model.to_string(),
                primary: "exit status: 1: no gpu".into(),
                fallback: "exit status: 1: manifest unknown".into(),
            })
        });
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let (coordinator, catalog) =
            coordinator(registry_with(&["llama3.1:8b"]), installer, generator);
        let (progress, events) = recorder();

        let outcome = coordinator
            .chat(ChatRequest::new("hi", Some("ghost:1b")), Some(progress))
            .await;

        match outcome {
            ChatOutcome::Error { kind, message } => {
                assert_eq!(kind, FailureKind::InstallFailed);
                assert!(message.contains("manifest unknown"));
            }
            other => panic!("Expected install failure, got {:?}", other),
        }
        assert_eq!(coordinator.current_model(), "llama3.1:8b");
        assert!(!catalog.contains(&ModelId::new("ghost:1b")));
        assert!(matches!(
            events.lock().last(),
            Some(ModelEvent::InstallFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_runtime_triggers_install_attempt() {
        let mut registry = MockModelRegistry::new();
        registry.expect_list_names().returning(|| {
            Err(RuntimeError::Spawn {
                command: "ollama list".into(),
                reason: "not found".into(),
            })
        });
        let mut installer = MockModelInstaller::new();
        installer.expect_install().times(1).returning(|model, _| {
            Err(InstallError::Failed {
                model: model.to_string(),
                primary: "not found".into(),
                fallback: "not found".into(),
            })
        });

        let (coordinator, _) = coordinator(registry, installer, echo_generator());
        let result = coordinator
            .ensure_model(Some(ModelId::new("gemma2:9b")), None)
            .await;

        assert!(result.is_err());
        assert_eq!(coordinator.current_model(), "llama3.1:8b");
    }

    #[tokio::test]
    async fn test_generation_timeout_is_reported_as_timeout() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _, timeout| Err(GenerationError::Timeout(timeout)));
        let (coordinator, _) = coordinator(
            MockModelRegistry::new(),
            MockModelInstaller::new(),
            generator,
        );

        let outcome = coordinator.chat(ChatRequest::new("hi", None), None).await;
        assert!(matches!(
            outcome,
            ChatOutcome::Error {
                kind: FailureKind::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_model_statuses_from_one_listing() {
        let mut registry = MockModelRegistry::new();
        registry
            .expect_list_names()
            .times(1)
            .returning(|| Ok(installed(&["mistral:7b"])));
        let (coordinator, _) = coordinator(
            registry,
            MockModelInstaller::new(),
            MockTextGenerator::new(),
        );

        assert_eq!(
            coordinator.model_statuses().await,
            vec![
                ModelStatus {
                    name: ModelId::new("llama3.1:8b"),
                    installed: false,
                },
                ModelStatus {
                    name: ModelId::new("mistral:7b"),
                    installed: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_pull_does_not_switch_session() {
        let mut installer = MockModelInstaller::new();
        installer.expect_install().times(1).returning(|model, _| {
            Ok(InstallReport {
                model: model.clone(),
                route: InstallRoute::Script,
                output: "done".into(),
            })
        });
        let (coordinator, catalog) = coordinator(
            MockModelRegistry::new(),
            installer,
            MockTextGenerator::new(),
        );

        let report = coordinator.pull(ModelId::new("qwen3:7b")).await.unwrap();
        assert_eq!(report.route, InstallRoute::Script);
        assert_eq!(coordinator.current_model(), "llama3.1:8b");
        assert!(catalog.contains(&ModelId::new("qwen3:7b")));
    }
}
