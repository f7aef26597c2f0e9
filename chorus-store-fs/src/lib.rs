#![deny(missing_docs)]
//! Filesystem-backed [`ConversationStore`]: one JSON file per chat.
//!
//! Directory layout:
//! ```text
//! root/
//!   <percent-encoded-chat-id>.json
//! ```
//!
//! Percent-encoded filenames and lazy directory creation, narrowed from a generic
//! scope/key map to one file per [`Chat`].
//! Mutations are serialized behind a single in-process mutex — spec §4.5 requires only
//! that concurrent appends to the *same* chat serialize, but a single global lock is
//! simpler than per-key locking and the contract permits it ("no cross-chat transaction
//! is required", not "no cross-chat interleaving prohibited").

use async_trait::async_trait;
use chorus_core::{Chat, ConversationStore, CoreError, Message, Usage};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Filesystem-backed conversation store, rooted at a directory created lazily on first
/// write.
pub struct FsStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FsStore {
    /// Create a new store rooted at `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn path_for(&self, chat_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_id(chat_id)))
    }

    async fn read_chat(&self, chat_id: &str) -> Result<Option<Chat>, CoreError> {
        let path = self.path_for(chat_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let chat: Chat = serde_json::from_str(&contents)
                    .map_err(|e| CoreError::Internal(format!("corrupt chat file: {e}")))?;
                Ok(Some(chat))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Internal(format!("read failed: {e}"))),
        }
    }

    async fn write_chat(&self, chat: &Chat) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::Internal(format!("mkdir failed: {e}")))?;
        let contents = serde_json::to_string_pretty(chat)
            .map_err(|e| CoreError::Internal(format!("serialize failed: {e}")))?;
        tokio::fs::write(self.path_for(&chat.id), contents)
            .await
            .map_err(|e| CoreError::Internal(format!("write failed: {e}")))?;
        Ok(())
    }
}

/// Percent-encode a chat id into a filesystem-safe filename stem.
fn encode_id(id: &str) -> String {
    let mut encoded = String::new();
    for ch in id.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => encoded.push(ch),
            _ => {
                for byte in ch.to_string().as_bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    encoded
}

#[async_trait]
impl ConversationStore for FsStore {
    async fn get_chat(&self, id: &str) -> Result<Option<Chat>, CoreError> {
        let _guard = self.lock.lock().await;
        let chat = self.read_chat(id).await?;
        Ok(chat.map(|mut c| {
            c.usage = Usage::recompute(&c.messages);
            c
        }))
    }

    async fn list_active_chats(&self) -> Result<Vec<Chat>, CoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(CoreError::Internal(format!("readdir failed: {e}"))),
        };
        let mut chats = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::Internal(format!("readdir failed: {e}")))?
        {
            let contents = tokio::fs::read_to_string(entry.path())
                .await
                .map_err(|e| CoreError::Internal(format!("read failed: {e}")))?;
            if let Ok(chat) = serde_json::from_str::<Chat>(&contents) {
                if chat.active {
                    chats.push(chat);
                }
            }
        }
        Ok(chats)
    }

    async fn create_chat(
        &self,
        agent_id: &str,
        model_id: &str,
        name: &str,
    ) -> Result<Chat, CoreError> {
        let _guard = self.lock.lock().await;
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
        self.write_chat(&chat).await?;
        Ok(chat)
    }

    async fn update_chat(
        &self,
        id: &str,
        agent_id: &str,
        model_id: &str,
        name: &str,
    ) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let mut chat = self
            .read_chat(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("chat {id}")))?;
        chat.agent_id = agent_id.to_string();
        chat.model_id = model_id.to_string();
        chat.name = name.to_string();
        chat.updated_at = Utc::now();
        self.write_chat(&chat).await
    }

    async fn delete_chat(&self, id: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Internal(format!("delete failed: {e}"))),
        }
    }

    async fn append_messages(
        &self,
        chat_id: &str,
        messages: Vec<Message>,
    ) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let mut chat = self
            .read_chat(chat_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("chat {chat_id}")))?;
        chat.messages.extend(messages);
        chat.updated_at = Utc::now();
        self.write_chat(&chat).await
    }

    async fn update_usage(&self, chat_id: &str, usage: Usage) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let mut chat = self
            .read_chat(chat_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("chat {chat_id}")))?;
        chat.usage = usage;
        self.write_chat(&chat).await
    }
}
