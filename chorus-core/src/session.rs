//! `AgentSession` — bookkeeping for sub-agent invocations (spec §3, §4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an [`AgentSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, not yet dispatched.
    Pending,
    /// The nested chat orchestration is in flight.
    Active,
    /// Finished successfully; `result` is populated.
    Completed,
    /// Finished with a timeout or error.
    Failed,
}

impl SessionStatus {
    /// `true` for `Completed`/`Failed` — sessions the Session Janitor may sweep once
    /// they've aged past the idle threshold (spec §3, §4.4).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// Bookkeeping record for one sub-agent call (spec §3, GLOSSARY "Session").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSession {
    /// Stable identity.
    pub id: String,
    /// The agent that issued the delegation.
    pub parent_agent_id: String,
    /// The agent the task was delegated to.
    pub sub_agent_id: String,
    /// Id of the nested chat created to run the sub-task.
    pub task_id: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Set when the session reaches a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// The sub-agent's final assistant text, set only on `Completed`.
    pub result: Option<String>,
}

impl AgentSession {
    /// `true` once this session has aged past `idle` since completion — the Session
    /// Janitor's sweep predicate (spec §4.4, default idle = 1 hour).
    #[must_use]
    pub fn is_sweepable(&self, now: DateTime<Utc>, idle: chrono::Duration) -> bool {
        self.status.is_terminal()
            && self
                .completed_at
                .is_some_and(|completed| now - completed >= idle)
    }
}
