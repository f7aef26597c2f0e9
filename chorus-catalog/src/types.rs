//! Canonical model-registry shapes (spec §4.6, §6 "Canonical model catalog").

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One model's cost/limit/capability entry in the canonical catalog (spec §4.6 Inputs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalModelEntry {
    /// Price per million input tokens.
    pub input_cost_per_mille: Decimal,
    /// Price per million output tokens.
    pub output_cost_per_mille: Decimal,
    /// Maximum context window, in tokens.
    pub context_window: u64,
    /// Model family (e.g. `"o"`, `"gpt"`, `"claude"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// `true` if the model supports extended reasoning.
    #[serde(default)]
    pub reasoning: bool,
    /// `true` if the model can emit tool calls.
    #[serde(default)]
    pub tool_call: bool,
    /// `true` if the model accepts a `temperature` parameter.
    #[serde(default)]
    pub temperature: bool,
    /// `true` if the model accepts file/image attachments.
    #[serde(default)]
    pub attachment: bool,
    /// `true` if the model supports a constrained structured-output mode.
    #[serde(default)]
    pub structured_output: bool,
}

/// One provider's entry in the canonical catalog: its served models, keyed by the
/// provider-native model id (spec §4.6 Inputs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProviderEntry {
    /// Models this provider serves, keyed by provider-native model id.
    pub models: HashMap<String, CanonicalModelEntry>,
}

/// The canonical catalog: `providerType -> { models: { modelId -> entry } }`
/// (spec §4.6 Inputs), keyed by the raw provider-type string (e.g. `"openai"`,
/// `"anthropic"`) rather than [`chorus_core::ProviderType`] directly — the catalog may
/// list provider types this deployment's closed enum doesn't model (spec §4.6 step 2's
/// "internal-only provider type"), and a raw string key lets the Refresher skip those
/// gracefully instead of failing to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCatalog {
    /// Per-provider-type entries.
    #[serde(flatten)]
    pub providers: HashMap<String, CanonicalProviderEntry>,
}

/// On-disk cache envelope (spec §6: `{fetchedAt, payload}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    /// When `payload` was fetched.
    pub fetched_at: DateTime<Utc>,
    /// The cached catalog.
    pub payload: CanonicalCatalog,
}

impl CacheEnvelope {
    /// `true` if `fetched_at` is more than `ttl` old, as of `now` (spec §4.6 Inputs:
    /// "a 24-hour TTL; a stale cache is preferred over a hard failure").
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.fetched_at >= ttl
    }
}

/// The default cache TTL (spec §4.6 Inputs).
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// The provider-type key this deployment's `ProviderType::Generic` maps to in the
/// canonical catalog. Generic providers are skipped by the Refresher (spec §4.6 step 2:
/// "skipping `generic`") since they host user-authored models with no canonical pricing.
pub const GENERIC_PROVIDER_KEY: &str = "generic";

/// Map a [`chorus_core::ProviderType`] onto its canonical-catalog key.
#[must_use]
pub fn provider_type_key(provider_type: chorus_core::ProviderType) -> &'static str {
    use chorus_core::ProviderType::*;
    match provider_type {
        OpenAi => "openai",
        Anthropic => "anthropic",
        Google => "google",
        Xai => "xai",
        DeepSeek => "deepseek",
        Ollama => "ollama",
        Groq => "groq",
        Together => "together",
        Mistral => "mistral",
        Generic => GENERIC_PROVIDER_KEY,
        // Never looked up in the canonical catalog (the Refresher special-cases
        // `Internal` before reaching this function); the key is unreachable but kept
        // distinct from `generic` in case a caller ever logs it.
        Internal => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_is_stale_past_ttl() {
        let now = Utc::now();
        let envelope = CacheEnvelope {
            fetched_at: now - chrono::Duration::hours(25),
            payload: CanonicalCatalog::default(),
        };
        assert!(envelope.is_stale(now, chrono::Duration::hours(24)));
    }

    #[test]
    fn cache_is_fresh_within_ttl() {
        let now = Utc::now();
        let envelope = CacheEnvelope {
            fetched_at: now - chrono::Duration::hours(1),
            payload: CanonicalCatalog::default(),
        };
        assert!(!envelope.is_stale(now, chrono::Duration::hours(24)));
    }

    #[test]
    fn provider_type_key_matches_canonical_catalog_naming() {
        assert_eq!(provider_type_key(chorus_core::ProviderType::OpenAi), "openai");
        assert_eq!(provider_type_key(chorus_core::ProviderType::DeepSeek), "deepseek");
        assert_eq!(provider_type_key(chorus_core::ProviderType::Generic), "generic");
    }
}
