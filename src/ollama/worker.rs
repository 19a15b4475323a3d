use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::constants::INSTALL_QUEUE_CAPACITY;
use crate::models::{InstallReport, ModelCatalog, ModelId, ModelInstaller};
use crate::utils::InstallError;

type InstallResult = Result<InstallReport, InstallError>;

struct InstallJob {
    model: ModelId,
    reply: oneshot::Sender<InstallResult>,
}

/// Handle to the background task that runs model installs.
///
/// Installs never run on a request task. Concurrent requests for the same
/// model share one install and all receive its result.
#[derive(Clone)]
pub struct InstallWorker {
    jobs: mpsc::Sender<InstallJob>,
}

impl InstallWorker {
    /// Start the worker. It stops, cancelling running installs, when
    /// `shutdown` fires.
    pub fn spawn(
        installer: Arc<dyn ModelInstaller>,
        catalog: Arc<ModelCatalog>,
        shutdown: CancellationToken,
    ) -> Self {
        let (jobs, rx) = mpsc::channel(INSTALL_QUEUE_CAPACITY);
        tokio::spawn(run(installer, catalog, rx, shutdown));
        Self { jobs }
    }

    /// Install `model` and wait for the result
    pub async fn install(&self, model: ModelId) -> InstallResult {
        let (reply, result) = oneshot::channel();
        self.jobs
            .send(InstallJob { model, reply })
            .await
            .map_err(|_| InstallError::WorkerGone)?;
        result.await.map_err(|_| InstallError::WorkerGone)?
    }
}

async fn run(
    installer: Arc<dyn ModelInstaller>,
    catalog: Arc<ModelCatalog>,
    mut jobs: mpsc::Receiver<InstallJob>,
    shutdown: CancellationToken,
) {
    let mut waiting: HashMap<ModelId, Vec<oneshot::Sender<InstallResult>>> = HashMap::new();
    let mut running: JoinSet<(ModelId, InstallResult)> = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            Some(finished) = running.join_next(), if !running.is_empty() => {
                if let Ok((model, result)) = finished {
                    finish(&catalog, &mut waiting, model, result);
                }
            }
            job = jobs.recv() => {
                let Some(InstallJob { model, reply }) = job else { break };

                if let Some(waiters) = waiting.get_mut(&model) {
                    debug!("Install of {} already running, waiting on it", model);
                    waiters.push(reply);
                    continue;
                }

                waiting.insert(model.clone(), vec![reply]);
                let installer = Arc::clone(&installer);
                let cancel = shutdown.child_token();
                running.spawn(async move {
                    let result = AssertUnwindSafe(installer.install(&model, cancel))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            Err(InstallError::Failed {
                                model: model.to_string(),
                                primary: "installer panicked".to_string(),
                                fallback: "not attempted".to_string(),
                            })
                        });
                    (model, result)
                });
            }
        }
    }

    // Running installs see the cancelled token and report back
    while let Some(finished) = running.join_next().await {
        if let Ok((model, result)) = finished {
            finish(&catalog, &mut waiting, model, result);
        }
    }
    info!("Install worker stopped");
}

fn finish(
    catalog: &ModelCatalog,
    waiting: &mut HashMap<ModelId, Vec<oneshot::Sender<InstallResult>>>,
    model: ModelId,
    result: InstallResult,
) {
    match &result {
        Ok(_) => {
            if catalog.insert(model.clone()) {
                info!("Added {} to available models", model);
            }
        }
        Err(e) => warn!("Install of {} failed: {}", model, e),
    }

    for reply in waiting.remove(&model).unwrap_or_default() {
        let _ = reply.send(result.clone());
    }
}
