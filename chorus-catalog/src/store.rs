//! The `ProviderModelStore` contract the Catalog Refresher reconciles against (spec §4.6).
//!
//! `chorus-core` only contracts storage for Chats (`ConversationStore`, spec §4.5); the
//! Refresher additionally needs Provider/Model CRUD, which spec §6's "four logical
//! collections" names but never gives its own trait. This mirrors `ConversationStore`'s
//! shape for the two collections the Refresher touches.

use async_trait::async_trait;
use chorus_core::{CoreError, Model, ModelPricing, Provider};
use std::collections::HashMap;
use std::sync::Mutex;

/// Persists Providers and Models (spec §6 "four logical collections": providers, models).
#[async_trait]
pub trait ProviderModelStore: Send + Sync {
    /// List every configured Provider.
    async fn list_providers(&self) -> Result<Vec<Provider>, CoreError>;

    /// Overwrite a Provider's `model_pricing` list, preserving its identity and
    /// `api_key_ref` (spec §4.6 step 2).
    async fn update_provider_pricing(
        &self,
        provider_id: &str,
        pricing: Vec<ModelPricing>,
    ) -> Result<(), CoreError>;

    /// List the Models bound to a given Provider.
    async fn list_models_for_provider(&self, provider_id: &str) -> Result<Vec<Model>, CoreError>;

    /// Create or update a Model (keyed by `id`).
    async fn upsert_model(&self, model: Model) -> Result<(), CoreError>;

    /// Delete a Model by id.
    async fn delete_model(&self, id: &str) -> Result<(), CoreError>;
}

fn _assert_object_safe(_: &dyn ProviderModelStore) {}

/// An in-memory [`ProviderModelStore`], for tests and the Refresher's own doctests.
#[derive(Debug, Default)]
pub struct InMemoryProviderModelStore {
    providers: Mutex<HashMap<String, Provider>>,
    models: Mutex<HashMap<String, Model>>,
}

impl InMemoryProviderModelStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a Provider, for test setup.
    pub fn seed_provider(&self, provider: Provider) {
        self.providers.lock().expect("lock poisoned").insert(provider.id.clone(), provider);
    }

    /// Seed the store with a Model, for test setup.
    pub fn seed_model(&self, model: Model) {
        self.models.lock().expect("lock poisoned").insert(model.id.clone(), model);
    }
}

#[async_trait]
impl ProviderModelStore for InMemoryProviderModelStore {
    async fn list_providers(&self) -> Result<Vec<Provider>, CoreError> {
        Ok(self.providers.lock().expect("lock poisoned").values().cloned().collect())
    }

    async fn update_provider_pricing(
        &self,
        provider_id: &str,
        pricing: Vec<ModelPricing>,
    ) -> Result<(), CoreError> {
        let mut providers = self.providers.lock().expect("lock poisoned");
        let provider = providers
            .get_mut(provider_id)
            .ok_or_else(|| CoreError::NotFound(format!("provider {provider_id}")))?;
        provider.model_pricing = pricing;
        Ok(())
    }

    async fn list_models_for_provider(&self, provider_id: &str) -> Result<Vec<Model>, CoreError> {
        Ok(self
            .models
            .lock()
            .expect("lock poisoned")
            .values()
            .filter(|m| m.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn upsert_model(&self, model: Model) -> Result<(), CoreError> {
        self.models.lock().expect("lock poisoned").insert(model.id.clone(), model);
        Ok(())
    }

    async fn delete_model(&self, id: &str) -> Result<(), CoreError> {
        self.models.lock().expect("lock poisoned").remove(id);
        Ok(())
    }
}
