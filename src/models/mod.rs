// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod catalog;
mod identifier;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use catalog::ModelCatalog;
pub use identifier::ModelId;
pub use traits::{ModelInstaller, ModelRegistry, TextGenerator};
pub use types::{
    ActiveModel, ChatOutcome, ChatRequest, FailureKind, InstallReport, InstallRoute,
    InstalledModel, ModelEvent, ModelStatus, ProgressCallback,
};

#[cfg(test)]
pub use traits::{MockModelInstaller, MockModelRegistry, MockTextGenerator};
