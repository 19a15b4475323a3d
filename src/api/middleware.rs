//! Request logging middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

use crate::constants::SLOW_REQUEST_THRESHOLD_MS;

/// Log every request with its status and duration.
///
/// Chat requests that install a model are expected to be slow; anything
/// over the threshold is still reported at warn level.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!("Request: {} {}", method, uri);

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if duration > Duration::from_millis(SLOW_REQUEST_THRESHOLD_MS) {
        tracing::warn!("Slow request: {} {} took {:?}", method, uri, duration);
    }

    tracing::info!(
        "Response: {} {} - {} in {}ms",
        method,
        uri,
        response.status(),
        duration.as_millis()
    );

    response
}
