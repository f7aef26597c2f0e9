//! Error taxonomy for the conversational orchestration core (spec §7).
//!
//! Every tag in the taxonomy is a variant, not a subtype hierarchy — callers match on the
//! variant rather than downcasting.

use thiserror::Error;

/// The core error taxonomy. Tool-level errors (`ToolArgumentError`, `ConfigError`) are
/// captured into the conversation as a `tool` message rather than propagated out of
/// [`crate::ConversationStore`] or the orchestrator — see spec §4.1 step 4d and §7.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// Malformed input: a missing id, a bad argument, an empty user message.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity (chat, agent, model, provider, tool) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller cancelled an in-flight turn.
    #[error("canceled")]
    Canceled,

    /// Network failure, rate limit, or 5xx — the caller may retry.
    #[error("transient error: {0}")]
    Transient(String),

    /// Invalid credentials; not retryable without caller intervention.
    #[error("auth error: {0}")]
    AuthError(String),

    /// A provider responded in a shape the adapter could not parse.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// Tool-call arguments failed validation against the tool's declared parameters.
    #[error("tool argument error: {0}")]
    ToolArgumentError(String),

    /// A tool's `#{ENV_NAME}#` configuration placeholder could not be resolved.
    #[error("config error: {0}")]
    ConfigError(String),

    /// The chat loop exceeded its iteration count or token budget (spec §4.1 step 5).
    #[error("loop limit exceeded: {0}")]
    LoopLimit(String),

    /// Repository or invariant violation that should never occur in a correct caller.
    #[error("internal error: {0}")]
    Internal(String),

    /// Catch-all for lower-level errors that don't map cleanly onto a tag above.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CoreError {
    /// `true` for errors the caller may reasonably retry (spec §7: `Transient`).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Transient(_))
    }

    /// `true` for errors that are captured into a `tool` message rather than aborting
    /// the turn (spec §4.1 step 4d, §7).
    #[must_use]
    pub fn is_tool_level(&self) -> bool {
        matches!(self, CoreError::ToolArgumentError(_) | CoreError::ConfigError(_))
    }
}
