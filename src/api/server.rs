use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{api::routes::router, app::AppState, utils::RelayError};

/// Bind the configured address and serve until ctrl-c or until
/// `state.shutdown` is cancelled
pub async fn serve(state: AppState) -> Result<(), RelayError> {
    let addr = state.config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    serve_on(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), RelayError> {
    info!("Server starting on {}...", listener.local_addr()?);
    info!("Default model: {}", state.coordinator.current_model());

    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!("Failed to listen for ctrl-c: {}", e);
                return shutdown.cancelled().await;
            }
            info!("Shutdown requested");
            shutdown.cancel();
        }
        _ = shutdown.cancelled() => {}
    }
}
