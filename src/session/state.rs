use parking_lot::RwLock;

use crate::models::ModelId;

/// Process-wide "current model" used by requests that do not name one
#[derive(Debug)]
pub struct SessionState {
    current_model: RwLock<ModelId>,
}

impl SessionState {
    pub fn new(default_model: ModelId) -> Self {
        Self {
            current_model: RwLock::new(default_model),
        }
    }

    /// Get the current model
    pub fn current_model(&self) -> ModelId {
        self.current_model.read().clone()
    }

    /// Make `model` current, returning the model it replaced
    pub fn switch_to(&self, model: ModelId) -> ModelId {
        std::mem::replace(&mut *self.current_model.write(), model)
    }
}
