/// Session management module - Gateway

mod coordinator;
mod state;

pub use coordinator::ModelSessionCoordinator;
pub use state::SessionState;
