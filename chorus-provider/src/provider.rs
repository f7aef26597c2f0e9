//! The normalized [`Provider`] trait (spec §2 component 1, §4.2).

use crate::error::ProviderError;
use crate::types::GenerateRequest;
use crate::types::GenerateResponse;
use async_trait::async_trait;

/// Converts a normalized chat-turn request into a provider-specific HTTP exchange and
/// back (spec §2 component 1).
///
/// Object-safe rather than generic over an RPITIT return: the Orchestrator selects an
/// adapter at runtime keyed by `Provider::provider_type` (spec §4.2 "A polymorphic
/// client keyed by providerType"), so this trait is dispatched through `Arc<dyn
/// Provider>` rather than monomorphized per caller — the same tradeoff `ToolDyn` makes
/// where runtime dispatch is required.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run one normalized chat-completion exchange.
    ///
    /// Implementations must not retry internally (spec §4.2 "No retry"): transient
    /// failures surface as [`ProviderError::Transient`]/`RateLimited` for the caller to
    /// decide on.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError>;
}
