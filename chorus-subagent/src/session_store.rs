//! `AgentSession` bookkeeping (spec §3, §4.4), grounded on the
//! `InMemorySessionStorage` pattern (`agent-runtime::session`): a concurrent hash map
//! guarded by a `tokio::sync::RwLock`.

use async_trait::async_trait;
use chorus_core::{AgentSession, CoreError, SessionStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persists `AgentSession` records for the Sub-Agent Tool and the Session Janitor.
#[async_trait]
pub trait AgentSessionStore: Send + Sync {
    /// Create a new `pending` session.
    async fn create(&self, session: AgentSession) -> Result<(), CoreError>;

    /// Fetch a session by id.
    async fn get(&self, id: &str) -> Result<Option<AgentSession>, CoreError>;

    /// Transition a session to `active`.
    async fn mark_active(&self, id: &str) -> Result<(), CoreError>;

    /// Transition a session to `completed`, recording its result text.
    async fn mark_completed(&self, id: &str, result: String) -> Result<(), CoreError>;

    /// Transition a session to `failed`, recording the failure as its result text.
    async fn mark_failed(&self, id: &str, error: String) -> Result<(), CoreError>;

    /// List every session, for the Session Janitor's sweep pass.
    async fn list(&self) -> Result<Vec<AgentSession>, CoreError>;

    /// Remove a session outright (the Session Janitor's sweep action).
    async fn remove(&self, id: &str) -> Result<(), CoreError>;
}

fn _assert_object_safe(_: &dyn AgentSessionStore) {}

/// An in-memory [`AgentSessionStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentSessionStore {
    sessions: Arc<RwLock<HashMap<String, AgentSession>>>,
}

impl InMemoryAgentSessionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn transition(
        &self,
        id: &str,
        status: SessionStatus,
        result: Option<String>,
    ) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("agent session {id}")))?;
        session.status = status;
        session.completed_at = Some(chrono::Utc::now());
        session.result = result;
        Ok(())
    }
}

#[async_trait]
impl AgentSessionStore for InMemoryAgentSessionStore {
    async fn create(&self, session: AgentSession) -> Result<(), CoreError> {
        self.sessions.write().await.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<AgentSession>, CoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn mark_active(&self, id: &str) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("agent session {id}")))?;
        session.status = SessionStatus::Active;
        Ok(())
    }

    async fn mark_completed(&self, id: &str, result: String) -> Result<(), CoreError> {
        self.transition(id, SessionStatus::Completed, Some(result)).await
    }

    async fn mark_failed(&self, id: &str, error: String) -> Result<(), CoreError> {
        self.transition(id, SessionStatus::Failed, Some(error)).await
    }

    async fn list(&self) -> Result<Vec<AgentSession>, CoreError> {
        Ok(self.sessions.read().await.values().cloned().collect())
    }

    async fn remove(&self, id: &str) -> Result<(), CoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending_session(id: &str) -> AgentSession {
        AgentSession {
            id: id.to_string(),
            parent_agent_id: "parent".into(),
            sub_agent_id: "child".into(),
            task_id: "chat-1".into(),
            status: SessionStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
        }
    }

    #[tokio::test]
    async fn lifecycle_pending_active_completed() {
        let store = InMemoryAgentSessionStore::new();
        store.create(pending_session("s1")).await.unwrap();

        store.mark_active("s1").await.unwrap();
        let session = store.get("s1").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Active);

        store.mark_completed("s1", "done".into()).await.unwrap();
        let session = store.get("s1").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.result.as_deref(), Some("done"));
        assert!(session.completed_at.is_some());
    }

    #[tokio::test]
    async fn marking_unknown_session_is_not_found() {
        let store = InMemoryAgentSessionStore::new();
        let err = store.mark_active("missing").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_sessions_record_the_error_text() {
        let store = InMemoryAgentSessionStore::new();
        store.create(pending_session("s1")).await.unwrap();
        store.mark_failed("s1", "timed out".into()).await.unwrap();
        let session = store.get("s1").await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(session.result.as_deref(), Some("timed out"));
    }

    #[tokio::test]
    async fn remove_drops_the_session() {
        let store = InMemoryAgentSessionStore::new();
        store.create(pending_session("s1")).await.unwrap();
        store.remove("s1").await.unwrap();
        assert!(store.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_every_session() {
        let store = InMemoryAgentSessionStore::new();
        store.create(pending_session("s1")).await.unwrap();
        store.create(pending_session("s2")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
