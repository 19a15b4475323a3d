use parking_lot::RwLock;

use super::identifier::ModelId;

/// Ordered, append-only list of models the relay advertises
#[derive(Debug, Default)]
pub struct ModelCatalog {
    models: RwLock<Vec<ModelId>>,
}

impl ModelCatalog {
    /// Build a catalog from configured names, dropping blanks and duplicates
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModelId>,
    {
        let catalog = Self::default();
        for model in models {
            let model = model.into();
            if !model.as_str().is_empty() {
                catalog.insert(model);
            }
        }
        catalog
    }

    /// Append `model` unless it is already listed. Returns true if added.
    pub fn insert(&self, model: ModelId) -> bool {
        let mut models = self.models.write();
        if models.contains(&model) {
            return false;
        }
        models.push(model);
        true
    }

    pub fn contains(&self, model: &ModelId) -> bool {
        self.models.read().contains(model)
    }

    pub fn snapshot(&self) -> Vec<ModelId> {
        self.models.read().clone()
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}
