//! `#{ENV_NAME}#` API-key indirection (spec §3 `Provider.api_key_ref`, §4.2, §9).
//!
//! Substitution happens at the last possible moment — immediately before the HTTP
//! exchange — so a resolved secret never gets persisted onto a [`chorus_core::Provider`]
//! entity (spec §9 "Placeholder substitution").

use crate::error::ProviderError;

/// Resolve an `api_key_ref` into a literal key.
///
/// - A literal string (no `#{...}#` wrapper) passes through unchanged.
/// - `#{NAME}#` is substituted from `std::env::var("NAME")`; a missing var fails.
/// - An empty ref is returned as-is when `allow_empty` is set (spec §4.2:
///   `ollama`/`generic` tolerate an empty ref).
pub fn resolve_api_key(api_key_ref: &str, allow_empty: bool) -> Result<String, ProviderError> {
    if api_key_ref.is_empty() {
        return if allow_empty {
            Ok(String::new())
        } else {
            Err(ProviderError::ConfigError(
                "api_key_ref is empty and this provider type requires a key".into(),
            ))
        };
    }
    match api_key_ref.strip_prefix("#{").and_then(|s| s.strip_suffix("}#")) {
        Some(env_name) => std::env::var(env_name)
            .map_err(|_| ProviderError::ConfigError(format!("env var {env_name} not set"))),
        None => Ok(api_key_ref.to_string()),
    }
}
