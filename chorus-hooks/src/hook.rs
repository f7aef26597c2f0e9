//! The `Hook` interface — observation and intervention points in the Orchestrator's
//! chat loop (SPEC_FULL.md §0, `chorus-hooks`).
//!
//! Not named by spec.md directly: an ordered hook pipeline is the idiomatic seat for
//! the lightweight observation/intervention points a production orchestrator grows
//! (cost-limit hooks, audit logging hooks) without requiring a breaking change to the
//! loop itself.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where in the Orchestrator's chat loop (spec §4.1) a hook fires.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Before each provider `generate` call (spec §4.1 step 4a).
    PreInference,
    /// After the provider responds, before tool execution (spec §4.1 step 4b/4c).
    PostInference,
    /// Before each tool call is executed (spec §4.1 step 4d).
    PreToolUse,
    /// After each tool call completes, before its result enters the conversation
    /// (spec §4.1 step 4d).
    PostToolUse,
    /// At each loop-limit check (spec §4.1 step 5).
    ExitCheck,
}

/// Read-only context available to a [`Hook`] at its firing point. Hooks observe and
/// decide via [`HookAction`]; they don't mutate this struct directly.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// Current hook point.
    pub point: HookPoint,
    /// The chat this turn belongs to.
    pub chat_id: String,
    /// Current tool being called (only at `PreToolUse`/`PostToolUse`).
    pub tool_name: Option<String>,
    /// Raw tool-call arguments JSON (only at `PreToolUse`).
    pub tool_arguments_json: Option<String>,
    /// Tool result text (only at `PostToolUse`).
    pub tool_result: Option<String>,
    /// Assistant text from the provider response (only at `PostInference`).
    pub assistant_text: Option<String>,
    /// Cumulative prompt+completion tokens charged so far this turn.
    pub tokens_used: u64,
    /// Cumulative cost charged so far this turn.
    pub cost: Decimal,
    /// Number of loop iterations completed so far this turn (spec §4.1 step 5).
    pub iterations_completed: u32,
}

impl HookContext {
    /// Build a [`HookContext`] carrying only the point and the chat it belongs to;
    /// other fields default to empty/zero and are filled in by the call site as
    /// appropriate for that point.
    #[must_use]
    pub fn new(point: HookPoint, chat_id: impl Into<String>) -> Self {
        Self {
            point,
            chat_id: chat_id.into(),
            tool_name: None,
            tool_arguments_json: None,
            tool_result: None,
            assistant_text: None,
            tokens_used: 0,
            cost: Decimal::ZERO,
            iterations_completed: 0,
        }
    }
}

/// What a [`Hook`] decides to do at a firing point.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookAction {
    /// Continue normally; no intervention.
    Continue,
    /// Halt the turn. The Orchestrator surfaces this as a fatal error to the caller
    /// (spec §7 `Internal`, carrying `reason`), distinct from [`chorus_core::CoreError::Canceled`]
    /// since it is hook-initiated rather than caller-initiated.
    Halt {
        /// Reason for halting, surfaced in the error.
        reason: String,
    },
    /// Skip this tool call (only valid at `PreToolUse`). A synthetic `"skipped by
    /// policy: <reason>"` result is backfilled instead of executing the tool.
    SkipTool {
        /// Reason for skipping.
        reason: String,
    },
    /// Replace the tool-call arguments before execution (only at `PreToolUse`).
    /// Used for parameter sanitization or injecting defaults.
    ModifyToolArguments {
        /// The replacement arguments JSON.
        new_arguments_json: Value,
    },
    /// Replace the tool's result text (only at `PostToolUse`), e.g. to redact
    /// secrets before the result enters the conversation.
    ModifyToolOutput {
        /// The replacement result text.
        new_output: String,
    },
}

/// A hook that can observe and intervene in the Orchestrator's chat loop.
///
/// Registered externally (by whoever constructs the Orchestrator) and dispatched by
/// [`crate::HookRegistry`] at the points named in [`Hook::points`]. The loop doesn't
/// know who's watching.
///
/// Hook handlers SHOULD complete quickly: an LLM-based guardrail that calls a model on
/// every tool use adds latency to every tool call. That cost is the hook author's
/// responsibility, not the registry's.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Which points this hook fires at.
    fn points(&self) -> &[HookPoint];

    /// Called at each registered point. Returning an error does not halt the turn —
    /// it is logged and treated as [`HookAction::Continue`]. Use [`HookAction::Halt`]
    /// to halt deliberately.
    async fn on_event(&self, ctx: &HookContext) -> Result<HookAction, chorus_core::CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn Hook) {}

    #[test]
    fn context_defaults_are_empty() {
        let ctx = HookContext::new(HookPoint::PreInference, "chat-1");
        assert_eq!(ctx.chat_id, "chat-1");
        assert!(ctx.tool_name.is_none());
        assert_eq!(ctx.tokens_used, 0);
        assert_eq!(ctx.cost, Decimal::ZERO);
    }
}
