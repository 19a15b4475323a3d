/// Ollama integration module - Gateway
mod client;
mod detector;
mod installer;
mod prompt;
mod worker;

pub use client::OllamaClient;
pub use detector::{
    check_installed, is_installed, model_installed, parse_listing, parse_names, OllamaCli,
};
pub use installer::ScriptInstaller;
pub use prompt::format_prompt;
pub use worker::InstallWorker;
