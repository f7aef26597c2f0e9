//! The `ConversationStore` contract (spec §4.5).

use crate::chat::{Chat, Message, Usage};
use crate::error::CoreError;
use async_trait::async_trait;

/// Persists Chats, Messages, and Usage. The core treats this as a mapping with atomic
/// per-chat update (spec §2 component 5, §4.5).
///
/// `append_messages` must be atomic per call; concurrent appends to the same chat are
/// serialized by the implementation (spec §4.5 guarantee). No cross-chat transaction is
/// required.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a chat by id.
    async fn get_chat(&self, id: &str) -> Result<Option<Chat>, CoreError>;

    /// List chats with `active = true`.
    async fn list_active_chats(&self) -> Result<Vec<Chat>, CoreError>;

    /// Create a new, empty chat bound to the given agent and model.
    async fn create_chat(
        &self,
        agent_id: &str,
        model_id: &str,
        name: &str,
    ) -> Result<Chat, CoreError>;

    /// Update a chat's agent/model/name binding (not its messages or usage).
    async fn update_chat(
        &self,
        id: &str,
        agent_id: &str,
        model_id: &str,
        name: &str,
    ) -> Result<(), CoreError>;

    /// Delete a chat and its messages.
    async fn delete_chat(&self, id: &str) -> Result<(), CoreError>;

    /// Atomically append one or more messages to a chat's history (spec §4.5 guarantee;
    /// spec §8 "Append-only history").
    async fn append_messages(&self, chat_id: &str, messages: Vec<Message>) -> Result<(), CoreError>;

    /// Overwrite a chat's cached `usage` aggregate.
    async fn update_usage(&self, chat_id: &str, usage: Usage) -> Result<(), CoreError>;
}
