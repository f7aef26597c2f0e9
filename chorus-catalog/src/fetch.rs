//! Fetching and disk-caching the canonical catalog (spec §4.6 Inputs, §6).

use crate::types::{CacheEnvelope, CanonicalCatalog};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from fetching or caching the canonical catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogFetchError {
    /// The HTTP request failed (network error, non-2xx status).
    #[error("catalog fetch failed: {0}")]
    Http(String),

    /// The response body could not be parsed as a [`CanonicalCatalog`].
    #[error("catalog response was not valid JSON: {0}")]
    Protocol(String),

    /// The on-disk cache file exists but could not be read or parsed.
    #[error("catalog cache at {path} is malformed: {source}")]
    CacheMalformed {
        /// Path of the offending cache file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Writing the cache file to disk failed.
    #[error("failed to write catalog cache at {path}: {source}")]
    CacheWrite {
        /// Path of the cache file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Fetches the canonical catalog from its source of truth (spec §4.6 Inputs).
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetch the current catalog, or fail (the caller falls back to the disk cache per
    /// spec §4.6 step 1).
    async fn fetch(&self) -> Result<CanonicalCatalog, CatalogFetchError>;
}

fn _assert_object_safe(_: &dyn CatalogFetcher) {}

/// An HTTP-backed [`CatalogFetcher`], following the same status-code triage as
/// `chorus_provider_openai`'s adapter.
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogFetcher {
    /// Build a fetcher targeting `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch(&self) -> Result<CanonicalCatalog, CatalogFetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogFetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogFetchError::Http(format!("HTTP {status}: {body}")));
        }

        response.json().await.map_err(|e| CatalogFetchError::Protocol(e.to_string()))
    }
}

/// Read the cache envelope at `path`, if it exists.
///
/// Returns `Ok(None)` when the file is absent (no cache yet, spec §4.6 step 1: "if no
/// cache exists, fail with `Transient`" is the caller's concern, not this helper's).
pub async fn read_cache(path: &Path) -> Result<Option<CacheEnvelope>, CatalogFetchError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let envelope = serde_json::from_str(&contents).map_err(|source| {
                CatalogFetchError::CacheMalformed { path: path.to_path_buf(), source }
            })?;
            Ok(Some(envelope))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CatalogFetchError::CacheWrite { path: path.to_path_buf(), source }),
    }
}

/// Persist `catalog` as the cache envelope at `path`, stamped with the current time.
pub async fn write_cache(path: &Path, catalog: &CanonicalCatalog) -> Result<(), CatalogFetchError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CatalogFetchError::CacheWrite { path: path.to_path_buf(), source })?;
    }
    let envelope = CacheEnvelope { fetched_at: Utc::now(), payload: catalog.clone() };
    let json = serde_json::to_string_pretty(&envelope).map_err(|source| {
        CatalogFetchError::CacheMalformed { path: path.to_path_buf(), source }
    })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| CatalogFetchError::CacheWrite { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanonicalModelEntry, CanonicalProviderEntry};
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn sample_catalog() -> CanonicalCatalog {
        let mut models = HashMap::new();
        models.insert(
            "gpt-4o".to_string(),
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

    #[tokio::test]
    async fn read_cache_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("providers-cache.json");
        assert!(read_cache(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_cache_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers-cache.json");
        let catalog = sample_catalog();

        write_cache(&path, &catalog).await.unwrap();
        let envelope = read_cache(&path).await.unwrap().expect("cache should exist");
        assert_eq!(envelope.payload, catalog);
        assert!(!envelope.is_stale(Utc::now(), chrono::Duration::hours(24)));
    }

    #[tokio::test]
    async fn malformed_cache_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers-cache.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = read_cache(&path).await.unwrap_err();
        assert!(matches!(err, CatalogFetchError::CacheMalformed { .. }));
    }
}
