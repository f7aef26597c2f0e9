//! The object-safe seam the Sub-Agent Tool (`chorus-subagent`) uses to recursively
//! invoke the Chat Orchestrator (spec §4.4, §9 "Cyclic references avoided").
//!
//! "The Sub-Agent tool is held by the Tool Registry and can reach the Chat
//! Orchestrator via a function reference injected at bootstrap — this avoids an
//! agent↔tool cycle while enabling recursive delegation." [`OrchestratorHandle`] is
//! that function reference, expressed as a trait so `chorus-subagent` depends on an
//! interface rather than reaching back into every concrete field of
//! [`crate::ChatOrchestrator`].

use crate::orchestrator::TurnContext;
use async_trait::async_trait;
use chorus_core::{CoreError, Message};

/// What a Sub-Agent Tool needs from the Chat Orchestrator: the ability to run one
/// turn on a (possibly freshly-created) chat (spec §4.4 step 4).
#[async_trait]
pub trait OrchestratorHandle: Send + Sync {
    /// Run one turn, recursively invoking the same chat loop (spec §4.1, §4.4).
    async fn send_message(&self, ctx: TurnContext, chat_id: &str, content: &str) -> Result<Message, CoreError>;
}

fn _assert_object_safe(_: &dyn OrchestratorHandle) {}
