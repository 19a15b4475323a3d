// Gateway module for api - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod error;
mod handlers;
mod middleware;
mod routes;
mod server;


// Public re-exports - the ONLY way to access api functionality
pub use error::{status_for, ApiError, ApiResult};
pub use handlers::{
    health::HealthResponse,
    models::{ModelInfoResponse, ModelStatusResponse, PullRequest, PullResponse},
    ws::Frame,
};
pub use routes::{api_routes, router};
pub use server::{serve, serve_on};
