//! Provider-level error taxonomy (spec §4.2, §7).

use thiserror::Error;

/// Errors a [`crate::Provider`] adapter may produce. Converts into
/// [`chorus_core::CoreError`] at the orchestrator boundary (spec §7).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Invalid credentials; non-retryable (spec §7 `AuthError`).
    #[error("auth error: {0}")]
    AuthError(String),

    /// The provider rate-limited the request (spec §7 `Transient`).
    #[error("rate limited")]
    RateLimited,

    /// The request was malformed in a way the provider rejected outright.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Network failure or 5xx; the caller may retry (spec §7 `Transient`).
    #[error("transient error: {0}")]
    Transient(String),

    /// The provider responded in a shape the adapter could not parse (spec §7
    /// `ProtocolError`).
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// An `#{ENV_NAME}#` API-key placeholder could not be resolved (spec §4.2, §4.3).
    #[error("config error: {0}")]
    ConfigError(String),
}

impl ProviderError {
    /// `true` for errors the caller may reasonably retry (spec §4.2 "No retry": the
    /// adapter never retries itself, but tags the error so its caller can decide).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::Transient(_))
    }
}

impl From<ProviderError> for chorus_core::CoreError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthError(msg) => chorus_core::CoreError::AuthError(msg),
            ProviderError::RateLimited => chorus_core::CoreError::Transient("rate limited".into()),
            ProviderError::BadRequest(msg) => chorus_core::CoreError::Validation(msg),
            ProviderError::Transient(msg) => chorus_core::CoreError::Transient(msg),
            ProviderError::ProtocolError(msg) => chorus_core::CoreError::ProtocolError(msg),
            ProviderError::ConfigError(msg) => chorus_core::CoreError::ConfigError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_tags() {
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::Transient("timeout".into()).is_retryable());
        assert!(!ProviderError::AuthError("bad key".into()).is_retryable());
        assert!(!ProviderError::BadRequest("x".into()).is_retryable());
        assert!(!ProviderError::ProtocolError("x".into()).is_retryable());
    }

    #[test]
    fn converts_into_core_error() {
        let core: chorus_core::CoreError = ProviderError::RateLimited.into();
        assert!(matches!(core, chorus_core::CoreError::Transient(_)));
        let core: chorus_core::CoreError = ProviderError::AuthError("x".into()).into();
        assert!(matches!(core, chorus_core::CoreError::AuthError(_)));
    }
}
