use std::collections::HashMap;

/// Bookkeeping record for one model currently held by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModel {
    /// Engine-side id, identical to the fragment id it was loaded from
    pub model_id: String,
    pub package_id: String,
    pub package_label: String,
    pub fragment_label: String,
    /// Resolved URL the fragment was fetched from
    pub url: String,
}

/// In-memory map of loaded models, keyed by model id.
///
/// Pure bookkeeping: the engine owns the models themselves, this only
/// mirrors which ids are live and where they came from.
#[derive(Debug, Default)]
pub struct Registry {
    models: HashMap<String, LoadedModel>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loaded model, replacing any previous record under its id
    pub fn insert(&mut self, model: LoadedModel) {
        self.models.insert(model.model_id.clone(), model);
    }

    /// Drop the record for a model id
    pub fn remove(&mut self, model_id: &str) -> Option<LoadedModel> {
        self.models.remove(model_id)
    }

    #[must_use]
    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    #[must_use]
    pub fn get(&self, model_id: &str) -> Option<&LoadedModel> {
        self.models.get(model_id)
    }

    /// All loaded records, sorted by model id for stable listings
    #[must_use]
    pub fn snapshot(&self) -> Vec<LoadedModel> {
        let mut models: Vec<LoadedModel> = self.models.values().cloned().collect();
        models.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        models
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }
}
