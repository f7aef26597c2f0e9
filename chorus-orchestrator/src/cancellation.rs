//! Per-chat cooperative cancellation (spec §4.1 "Cancellation semantics", §5).
//!
//! A [`CancellationTable`] is the Orchestrator's one piece of mutable shared state
//! besides the Tool Registry and the Agent-Session table (spec §9 "Global mutable
//! state"). It's guarded by a `tokio::sync::RwLock` rather than a hand-rolled lock,
//! keeping every concurrency primitive in the crate sourced from `tokio`.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Tracks one [`CancellationToken`] per in-flight chat turn.
///
/// The Orchestrator registers a token at turn start and removes it on completion
/// (spec §5 "Cancellation"). A concurrent `send_message` call on the same chat is not
/// supported by the contract (spec §4.1), so at most one token is live per `chat_id`.
#[derive(Default)]
pub struct CancellationTable {
    tokens: RwLock<HashMap<String, CancellationToken>>,
}

impl CancellationTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh token for `chat_id`, overwriting any stale entry left behind
    /// by a crashed prior turn (spec's own non-goal: "a crash mid-turn abandons that
    /// turn" — the table must not wedge a chat permanently).
    pub async fn register(&self, chat_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.write().await.insert(chat_id.to_string(), token.clone());
        token
    }

    /// Remove the entry for `chat_id`, called once the turn reaches any exit path.
    pub async fn unregister(&self, chat_id: &str) {
        self.tokens.write().await.remove(chat_id);
    }

    /// Signal cancellation for an in-flight turn on `chat_id`. Returns `true` if a
    /// turn was actually in flight.
    pub async fn cancel(&self, chat_id: &str) -> bool {
        match self.tokens.read().await.get(chat_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// `true` if a turn is currently in flight for `chat_id`.
    pub async fn is_active(&self, chat_id: &str) -> bool {
        self.tokens.read().await.contains_key(chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_without_registration_is_a_no_op() {
        let table = CancellationTable::new();
        assert!(!table.cancel("chat-1").await);
    }

    #[tokio::test]
    async fn register_then_cancel_signals_the_token() {
        let table = CancellationTable::new();
        let token = table.register("chat-1").await;
        assert!(table.is_active("chat-1").await);
        assert!(table.cancel("chat-1").await);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn unregister_clears_the_entry() {
        let table = CancellationTable::new();
        table.register("chat-1").await;
        table.unregister("chat-1").await;
        assert!(!table.is_active("chat-1").await);
    }

    #[tokio::test]
    async fn re_registering_replaces_a_stale_token() {
        let table = CancellationTable::new();
        let first = table.register("chat-1").await;
        let second = table.register("chat-1").await;
        table.cancel("chat-1").await;
        assert!(!first.is_cancelled());
        assert!(second.is_cancelled());
    }
}
