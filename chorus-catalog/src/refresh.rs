//! The Catalog Refresher algorithm (spec §4.6).

use crate::display_name::display_name;
use crate::fetch::{read_cache, write_cache, CatalogFetchError, CatalogFetcher};
use crate::store::ProviderModelStore;
use crate::types::{provider_type_key, CanonicalProviderEntry};
use chorus_core::{Capabilities, CoreError, Model, ModelPricing, Provider, ProviderType};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// The provider-native model name the zero-cost placeholder is published under for
/// `ProviderType::Internal` providers (spec §4.6 step 2: "a zero-cost placeholder
/// entry" — this type never appears in the external canonical catalog).
const INTERNAL_PLACEHOLDER_MODEL_NAME: &str = "internal";

/// Context window seeded for an internal provider's placeholder pricing when none of
/// its existing Models declare one.
const INTERNAL_PLACEHOLDER_CONTEXT_WINDOW: u64 = 100_000;

/// Errors from a catalog refresh (spec §4.6 step 1, §7 `Transient`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogRefreshError {
    /// The fetch failed and no cached copy exists to fall back to (spec §4.6 step 1).
    #[error("catalog fetch failed and no cached copy is available")]
    NoCatalogAvailable,

    /// Reading or writing the disk cache failed.
    #[error(transparent)]
    Cache(#[from] CatalogFetchError),

    /// The `ProviderModelStore` failed while reconciling Providers/Models.
    #[error(transparent)]
    Store(#[from] CoreError),
}

impl From<CatalogRefreshError> for CoreError {
    fn from(err: CatalogRefreshError) -> Self {
        match err {
            CatalogRefreshError::NoCatalogAvailable => {
                CoreError::Transient("catalog fetch failed and no cache available".into())
            }
            CatalogRefreshError::Cache(e) => CoreError::Transient(e.to_string()),
            CatalogRefreshError::Store(e) => e,
        }
    }
}

/// Seed values the Refresher applies to newly-created Models (spec §4.6 step 3).
#[derive(Debug, Clone, Copy)]
pub struct RefreshDefaults {
    /// Sampling temperature for a freshly-created Model.
    pub default_temperature: f64,
    /// Fraction of a model's context window to seed `max_tokens` with.
    pub default_max_tokens_ratio: f64,
}

/// Runs the Catalog Refresher algorithm against a [`CatalogFetcher`] and a
/// [`ProviderModelStore`] (spec §4.6).
pub struct Refresher {
    fetcher: Arc<dyn CatalogFetcher>,
    store: Arc<dyn ProviderModelStore>,
    cache_path: PathBuf,
}

impl Refresher {
    /// Build a Refresher. `cache_path` is the on-disk cache envelope location (spec §6:
    /// `<userDataDir>/providers-cache.json`).
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn CatalogFetcher>,
        store: Arc<dyn ProviderModelStore>,
        cache_path: PathBuf,
    ) -> Self {
        Self { fetcher, store, cache_path }
    }

    /// Run one refresh pass (spec §4.6 steps 1-4).
    pub async fn refresh(&self, defaults: RefreshDefaults) -> Result<(), CatalogRefreshError> {
        let catalog = match self.fetcher.fetch().await {
            Ok(catalog) => {
                write_cache(&self.cache_path, &catalog).await?;
                catalog
            }
            Err(fetch_err) => {
                warn!(error = %fetch_err, "catalog fetch failed, falling back to cache");
                match read_cache(&self.cache_path).await? {
                    Some(envelope) => envelope.payload,
                    None => return Err(CatalogRefreshError::NoCatalogAvailable),
                }
            }
        };

        let providers = self.store.list_providers().await?;
        for provider in providers {
            if provider.provider_type == ProviderType::Generic {
                continue;
            }
            if provider.provider_type == ProviderType::Internal {
                self.apply_internal_placeholder(&provider).await?;
                continue;
            }
            let key = provider_type_key(provider.provider_type);
            let Some(entry) = catalog.providers.get(key) else {
                continue;
            };
            self.reconcile_provider(&provider, entry, defaults).await?;
        }

        info!("catalog refresh complete");
        Ok(())
    }

    /// Give an internal-only Provider a single zero-cost `ModelPricing` entry instead
    /// of consulting the canonical catalog, which never lists this type (spec §4.6
    /// step 2). Idempotent: a provider that already carries the placeholder is left
    /// untouched, and existing Models on it are never reconciled/deleted — they are
    /// not refresher-owned in the catalog sense.
    async fn apply_internal_placeholder(&self, provider: &Provider) -> Result<(), CatalogRefreshError> {
        let context_window = self
            .store
            .list_models_for_provider(&provider.id)
            .await?
            .into_iter()
            .filter_map(|m| m.context_window)
            .max()
            .unwrap_or(INTERNAL_PLACEHOLDER_CONTEXT_WINDOW);
        let placeholder = vec![ModelPricing {
            name: INTERNAL_PLACEHOLDER_MODEL_NAME.to_string(),
            input_price_per_mille: Decimal::ZERO,
            output_price_per_mille: Decimal::ZERO,
            context_window,
        }];
        if provider.model_pricing != placeholder {
            self.store.update_provider_pricing(&provider.id, placeholder).await?;
        }
        Ok(())
    }

    async fn reconcile_provider(
        &self,
        provider: &Provider,
        entry: &CanonicalProviderEntry,
        defaults: RefreshDefaults,
    ) -> Result<(), CatalogRefreshError> {
        let pricing: Vec<ModelPricing> = entry
            .models
            .iter()
            .map(|(model_id, model_entry)| ModelPricing {
                name: model_id.clone(),
                input_price_per_mille: model_entry.input_cost_per_mille,
                output_price_per_mille: model_entry.output_cost_per_mille,
                context_window: model_entry.context_window,
            })
            .collect();
        self.store.update_provider_pricing(&provider.id, pricing).await?;

        let existing = self.store.list_models_for_provider(&provider.id).await?;
        let mut by_model_name: HashMap<String, Model> =
            existing.into_iter().map(|m| (m.model_name.clone(), m)).collect();

        for (model_id, model_entry) in &entry.models {
            match by_model_name.remove(model_id) {
                Some(mut model) => {
                    model.context_window = Some(model_entry.context_window);
                    let regenerated = display_name(model_id);
                    if model.name != regenerated {
                        model.name = regenerated;
                    }
                    self.store.upsert_model(model).await?;
                }
                None => {
                    let model = Model {
                        id: Uuid::new_v4().to_string(),
                        name: display_name(model_id),
                        provider_id: provider.id.clone(),
                        provider_type: provider.provider_type,
                        model_name: model_id.clone(),
                        temperature: Some(defaults.default_temperature),
                        max_tokens: Some(
                            (defaults.default_max_tokens_ratio * model_entry.context_window as f64)
                                as u64,
                        ),
                        context_window: Some(model_entry.context_window),
                        reasoning_effort: Some(String::new()),
                        capabilities: Capabilities {
                            family: model_entry.family.clone(),
                            reasoning: model_entry.reasoning,
                            tool_call: model_entry.tool_call,
                            temperature_cap: model_entry.temperature,
                            attachment: model_entry.attachment,
                            structured_output: model_entry.structured_output,
                        },
                    };
                    self.store.upsert_model(model).await?;
                }
            }
        }

        // Whatever remains in `by_model_name` was refresher-owned and dropped from the
        // catalog (spec §4.6 step 3: "these are refresher-owned; user-authored models
        // sit on `generic` providers and are unaffected").
        for orphan in by_model_name.into_values() {
            self.store.delete_model(&orphan.id).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryProviderModelStore;
    use crate::types::{CanonicalCatalog, CanonicalModelEntry};
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    struct FixedFetcher(CanonicalCatalog);

    #[async_trait]
    impl CatalogFetcher for FixedFetcher {
        async fn fetch(&self) -> Result<CanonicalCatalog, CatalogFetchError> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl CatalogFetcher for FailingFetcher {
        async fn fetch(&self) -> Result<CanonicalCatalog, CatalogFetchError> {
            Err(CatalogFetchError::Http("connection refused".into()))
        }
    }

    fn provider(id: &str) -> Provider {
        Provider {
            id: id.into(),
            provider_type: ProviderType::OpenAi,
            display_name: "OpenAI".into(),
            base_url: "https://api.openai.com".into(),
            api_key_ref: "#{OPENAI_API_KEY}#".into(),
            model_pricing: vec![],
        }
    }

    fn catalog_with_one_model() -> CanonicalCatalog {
        let mut models = HashMap::new();
        models.insert(
            "gpt-4o-2024-05-13".to_string(),
            CanonicalModelEntry {
                input_cost_per_mille: Decimal::new(25, 1),
                output_cost_per_mille: Decimal::new(100, 1),
                context_window: 128_000,
                family: Some("gpt".into()),
                reasoning: false,
                tool_call: true,
                temperature: true,
                attachment: true,
                structured_output: true,
            },
        );
        let mut providers = HashMap::new();
        providers.insert("openai".to_string(), CanonicalProviderEntry { models });
        CanonicalCatalog { providers }
    }

    fn defaults() -> RefreshDefaults {
        RefreshDefaults { default_temperature: 0.7, default_max_tokens_ratio: 0.25 }
    }

    #[tokio::test]
    async fn creates_model_on_first_refresh() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        store.seed_provider(provider("p1"));
        let fetcher = Arc::new(FixedFetcher(catalog_with_one_model()));
        let dir = tempfile::tempdir().unwrap();
        let refresher = Refresher::new(fetcher, store.clone(), dir.path().join("cache.json"));

        refresher.refresh(defaults()).await.unwrap();

        let models = store.list_models_for_provider("p1").await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].model_name, "gpt-4o-2024-05-13");
        assert_eq!(models[0].name, "Gpt 4o");
        assert_eq!(models[0].context_window, Some(128_000));
        assert_eq!(models[0].max_tokens, Some(32_000));
        assert!(models[0].capabilities.tool_call);

        let providers = store.list_providers().await.unwrap();
        assert_eq!(providers[0].model_pricing.len(), 1);
        assert_eq!(providers[0].api_key_ref, "#{OPENAI_API_KEY}#");
    }

    #[tokio::test]
    async fn second_refresh_updates_context_window_without_duplicating() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        store.seed_provider(provider("p1"));
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");

        let first = Refresher::new(
            Arc::new(FixedFetcher(catalog_with_one_model())),
            store.clone(),
            cache_path.clone(),
        );
        first.refresh(defaults()).await.unwrap();

        let mut updated_catalog = catalog_with_one_model();
        updated_catalog
            .providers
            .get_mut("openai")
            .unwrap()
            .models
            .get_mut("gpt-4o-2024-05-13")
            .unwrap()
            .context_window = 256_000;

        let second =
            Refresher::new(Arc::new(FixedFetcher(updated_catalog)), store.clone(), cache_path);
        second.refresh(defaults()).await.unwrap();

        let models = store.list_models_for_provider("p1").await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].context_window, Some(256_000));
    }

    #[tokio::test]
    async fn model_dropped_from_catalog_is_deleted() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        store.seed_provider(provider("p1"));
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");

        let first = Refresher::new(
            Arc::new(FixedFetcher(catalog_with_one_model())),
            store.clone(),
            cache_path.clone(),
        );
        first.refresh(defaults()).await.unwrap();
        assert_eq!(store.list_models_for_provider("p1").await.unwrap().len(), 1);

        let empty_catalog = CanonicalCatalog {
            providers: {
                let mut m = HashMap::new();
                m.insert("openai".to_string(), CanonicalProviderEntry::default());
                m
            },
        };
        let second =
            Refresher::new(Arc::new(FixedFetcher(empty_catalog)), store.clone(), cache_path);
        second.refresh(defaults()).await.unwrap();

        assert!(store.list_models_for_provider("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn generic_providers_are_skipped() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        let mut generic = provider("p1");
        generic.provider_type = ProviderType::Generic;
        store.seed_provider(generic);
        let dir = tempfile::tempdir().unwrap();
        let refresher = Refresher::new(
            Arc::new(FixedFetcher(catalog_with_one_model())),
            store.clone(),
            dir.path().join("cache.json"),
        );

        refresher.refresh(defaults()).await.unwrap();
        assert!(store.list_models_for_provider("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_cache() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        store.seed_provider(provider("p1"));
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");

        let warm = Refresher::new(
            Arc::new(FixedFetcher(catalog_with_one_model())),
            store.clone(),
            cache_path.clone(),
        );
        warm.refresh(defaults()).await.unwrap();

        let degraded = Refresher::new(Arc::new(FailingFetcher), store.clone(), cache_path);
        degraded.refresh(defaults()).await.unwrap();

        assert_eq!(store.list_models_for_provider("p1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_with_no_cache_is_transient() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        store.seed_provider(provider("p1"));
        let dir = tempfile::tempdir().unwrap();
        let refresher = Refresher::new(
            Arc::new(FailingFetcher),
            store,
            dir.path().join("never-written.json"),
        );

        let err = refresher.refresh(defaults()).await.unwrap_err();
        assert!(matches!(err, CatalogRefreshError::NoCatalogAvailable));
    }

    #[test]
    fn refresh_error_converts_into_core_error() {
        let core: CoreError = CatalogRefreshError::NoCatalogAvailable.into();
        assert!(matches!(core, CoreError::Transient(_)));
    }

    /// Spec §4.6 step 2: the internal-only provider type gets a zero-cost placeholder
    /// instead of a catalog lookup (the catalog never lists it).
    #[tokio::test]
    async fn internal_provider_gets_zero_cost_placeholder() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        let mut internal = provider("p-internal");
        internal.provider_type = ProviderType::Internal;
        store.seed_provider(internal);
        let dir = tempfile::tempdir().unwrap();
        let refresher = Refresher::new(
            Arc::new(FixedFetcher(catalog_with_one_model())),
            store.clone(),
            dir.path().join("cache.json"),
        );

        refresher.refresh(defaults()).await.unwrap();

        let providers = store.list_providers().await.unwrap();
        let pricing = &providers[0].model_pricing;
        assert_eq!(pricing.len(), 1);
        assert_eq!(pricing[0].name, "internal");
        assert!(pricing[0].input_price_per_mille.is_zero());
        assert!(pricing[0].output_price_per_mille.is_zero());
    }

    /// Running the refresh twice against an internal provider is idempotent: the
    /// placeholder isn't rewritten once it's already in place.
    #[tokio::test]
    async fn internal_provider_placeholder_is_idempotent() {
        let store = Arc::new(InMemoryProviderModelStore::new());
        let mut internal = provider("p-internal");
        internal.provider_type = ProviderType::Internal;
        store.seed_provider(internal);
        let dir = tempfile::tempdir().unwrap();
        let refresher = Refresher::new(
            Arc::new(FixedFetcher(catalog_with_one_model())),
            store.clone(),
            dir.path().join("cache.json"),
        );

        refresher.refresh(defaults()).await.unwrap();
        refresher.refresh(defaults()).await.unwrap();

        let providers = store.list_providers().await.unwrap();
        assert_eq!(providers[0].model_pricing.len(), 1);
    }
}
