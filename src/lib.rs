pub mod api;
pub mod app;
pub mod cli;
pub mod constants;
pub mod models;
pub mod ollama;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, AppState, Config};
pub use models::{ChatOutcome, ChatRequest, ModelId};
pub use session::ModelSessionCoordinator;
pub use utils::RelayError;
