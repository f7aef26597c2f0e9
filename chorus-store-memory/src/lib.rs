#![deny(missing_docs)]
//! In-memory [`ConversationStore`] backed by a `HashMap` behind a `RwLock`.
//!
//! Suitable for testing and single-process use where persistence across restarts is not
//! required. Narrowed from a generic scope/key map to one entry per [`Chat`] keyed by id.

use async_trait::async_trait;
use chorus_core::{Chat, ConversationStore, CoreError, Message, Usage};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory conversation store.
pub struct MemoryStore {
    chats: RwLock<HashMap<String, Chat>>,
}

impl MemoryStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chats: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_chat(&self, id: &str) -> Result<Option<Chat>, CoreError> {
        let chats = self.chats.read().await;
        Ok(chats.get(id).map(|chat| {
            let mut chat = chat.clone();
            chat.usage = Usage::recompute(&chat.messages);
            chat
        }))
    }

    async fn list_active_chats(&self) -> Result<Vec<Chat>, CoreError> {
        let chats = self.chats.read().await;
        Ok(chats.values().filter(|c| c.active).cloned().collect())
    }

    async fn create_chat(
        &self,
        agent_id: &str,
        model_id: &str,
        name: &str,
    ) -> Result<Chat, CoreError> {
        let now = Utc::now();
        let chat = Chat {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            agent_id: agent_id.to_string(),
            model_id: model_id.to_string(),
            messages: Vec::new(),
            usage: Usage::default(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.chats
            .write()
            .await
            .insert(chat.id.clone(), chat.clone());
        Ok(chat)
    }

    async fn update_chat(
        &self,
        id: &str,
        agent_id: &str,
        model_id: &str,
        name: &str,
    ) -> Result<(), CoreError> {
        let mut chats = self.chats.write().await;
        let chat = chats
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("chat {id}")))?;
        chat.agent_id = agent_id.to_string();
        chat.model_id = model_id.to_string();
        chat.name = name.to_string();
        chat.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_chat(&self, id: &str) -> Result<(), CoreError> {
        self.chats.write().await.remove(id);
        Ok(())
    }

    async fn append_messages(
        &self,
        chat_id: &str,
        messages: Vec<Message>,
    ) -> Result<(), CoreError> {
        let mut chats = self.chats.write().await;
        let chat = chats
            .get_mut(chat_id)
            .ok_or_else(|| CoreError::NotFound(format!("chat {chat_id}")))?;
        chat.messages.extend(messages);
        chat.updated_at = Utc::now();
        Ok(())
    }

    async fn update_usage(&self, chat_id: &str, usage: Usage) -> Result<(), CoreError> {
        let mut chats = self.chats.write().await;
        let chat = chats
            .get_mut(chat_id)
            .ok_or_else(|| CoreError::NotFound(format!("chat {chat_id}")))?;
        chat.usage = usage;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::MessageRole;

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let store = MemoryStore::new();
        let chat = store.create_chat("agent-1", "model-1", "New Chat").await.unwrap();
        let loaded = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, chat.id);
        assert!(loaded.active);
    }

    #[tokio::test]
    async fn append_messages_is_ordered_and_cumulative() {
        let store = MemoryStore::new();
        let chat = store.create_chat("a", "m", "c").await.unwrap();
        store
            .append_messages(&chat.id, vec![Message::user("hello")])
            .await
            .unwrap();
        store
            .append_messages(&chat.id, vec![Message::user("world")])
            .await
            .unwrap();
        let loaded = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[0].content, "hello");
        assert_eq!(loaded.messages[1].content, "world");
    }

    #[tokio::test]
    async fn get_missing_chat_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get_chat("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn append_to_missing_chat_errors() {
        let store = MemoryStore::new();
        let err = store
            .append_messages("missing", vec![Message::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_active_chats_excludes_inactive() {
        let store = MemoryStore::new();
        let chat = store.create_chat("a", "m", "c").await.unwrap();
        store.update_chat(&chat.id, "a", "m", "renamed").await.unwrap();
        let active = store.list_active_chats().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "renamed");
    }

    #[tokio::test]
    async fn usage_is_recomputed_on_load() {
        let store = MemoryStore::new();
        let chat = store.create_chat("a", "m", "c").await.unwrap();
        let mut assistant = Message::user("ignored");
        assistant.role = MessageRole::Assistant;
        assistant.token_usage = Some(chorus_core::TokenAccounting {
            prompt: 5,
            completion: 2,
            total: 7,
            cost: Default::default(),
        });
        store.append_messages(&chat.id, vec![assistant]).await.unwrap();
        let loaded = store.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(loaded.usage.total_tokens, 7);
    }
}
