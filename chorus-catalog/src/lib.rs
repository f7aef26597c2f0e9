#![deny(missing_docs)]
//! Catalog Refresher, display-name generation, and the Model Filter for chorus
//! (spec §4.6, §4.8).

mod display_name;
mod fetch;
mod filter;
mod refresh;
mod store;
mod types;

pub use display_name::display_name;
pub use fetch::{read_cache, write_cache, CatalogFetchError, CatalogFetcher, HttpCatalogFetcher};
pub use filter::is_chat_compatible;
pub use refresh::{CatalogRefreshError, RefreshDefaults, Refresher};
pub use store::{InMemoryProviderModelStore, ProviderModelStore};
pub use types::{
    provider_type_key, CacheEnvelope, CanonicalCatalog, CanonicalModelEntry,
    CanonicalProviderEntry, DEFAULT_CACHE_TTL_HOURS, GENERIC_PROVIDER_KEY,
};
