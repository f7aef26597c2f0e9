//! Selects a concrete [`chorus_provider::Provider`] adapter for a
//! [`chorus_core::ProviderType`] (spec §4.2 "A polymorphic client keyed by
//! providerType", §9 "Polymorphism over providers").

use chorus_core::{Provider as ProviderEntity, ProviderType};
use chorus_provider::{Provider, ProviderError};
use std::sync::Arc;

/// Build the adapter this Provider entity's `provider_type` dictates.
///
/// `openai`/`anthropic` get their dedicated adapters; every other type (`google`,
/// `xai`, `deepseek`, `ollama`, `groq`, `together`, `mistral`, `generic`) is served by
/// the shared OpenAI-compatible adapter (DESIGN.md "Open Questions").
pub fn build_provider(provider: &ProviderEntity) -> Result<Arc<dyn Provider>, ProviderError> {
    match provider.provider_type {
        ProviderType::OpenAi => {
            let adapter = chorus_provider_openai::OpenAiProvider::new(&provider.api_key_ref)?
                .with_url(format!("{}/chat/completions", provider.base_url.trim_end_matches('/')));
            Ok(Arc::new(adapter))
        }
        ProviderType::Anthropic => {
            let adapter = chorus_provider_anthropic::AnthropicProvider::new(&provider.api_key_ref)?
                .with_url(format!("{}/messages", provider.base_url.trim_end_matches('/')));
            Ok(Arc::new(adapter))
        }
        other => {
            let adapter = chorus_provider_compat::CompatProvider::new(
                &provider.base_url,
                &provider.api_key_ref,
                other,
            )?;
            Ok(Arc::new(adapter))
        }
    }
}

/// Selects a [`Provider`] adapter for a Provider entity.
///
/// Indirected behind a trait (rather than calling [`build_provider`] directly from
/// the Orchestrator) so tests can inject a canned adapter without standing up real
/// HTTP credentials. `chorus_provider::Provider` is object-safe rather than generic
/// (see that trait's doc comment), so the Orchestrator needs an explicit factory
/// seam to get the same testability a generic `execute<P: Provider>` would get for
/// free.
pub trait ProviderFactory: Send + Sync {
    /// Build (or look up) the adapter for this Provider entity.
    fn build(&self, provider: &ProviderEntity) -> Result<Arc<dyn Provider>, ProviderError>;
}

/// The production [`ProviderFactory`]: dispatches on `provider_type` via
/// [`build_provider`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn build(&self, provider: &ProviderEntity) -> Result<Arc<dyn Provider>, ProviderError> {
        build_provider(provider)
    }
}
