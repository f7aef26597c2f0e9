//! Chat, Message, and Usage entities (spec §3).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `role` of a [`Message`] (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The agent's system prompt. If present, first and singular (spec §3 invariant).
    System,
    /// A message from the end user.
    User,
    /// A message from the model, optionally carrying `tool_calls`.
    Assistant,
    /// A tool execution result, carrying `tool_call_id`.
    Tool,
}

/// One tool call requested by an assistant message (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Opaque id assigned by the provider; echoed back in the matching `tool` message's
    /// `tool_call_id` (spec §3 ordering invariant, §8 "Tool-call pairing").
    pub id: String,
    /// Tool name to invoke.
    pub name: String,
    /// Raw JSON-encoded arguments, as emitted by the provider.
    pub arguments_json: String,
}

/// Token usage and cost attributed to a single [`Message`] (spec §3).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenAccounting {
    /// Prompt/input tokens charged for this turn's call.
    pub prompt: u64,
    /// Completion/output tokens charged for this turn's call.
    pub completion: u64,
    /// `prompt + completion`.
    pub total: u64,
    /// Cost of this call, computed from the Provider's pricing at the time of the call
    /// (spec §4.1 "Token accounting").
    pub cost: Decimal,
}

/// A persisted conversation entry (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Stable identity, assigned fresh when appended (spec §4.1 step 2).
    pub id: String,
    /// Message role.
    pub role: MessageRole,
    /// Text content. For `tool` messages this is the result string, or an
    /// `"error: ..."`-prefixed string on tool failure (spec §4.1 step 4d).
    pub content: String,
    /// Assignment timestamp.
    pub timestamp: DateTime<Utc>,
    /// Present on `tool` messages; matches the `id` of the requesting `ToolCallRequest`.
    pub tool_call_id: Option<String>,
    /// Present on `assistant` messages that request tool execution.
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    /// Present when this message consumed tokens (assistant messages only).
    pub token_usage: Option<TokenAccounting>,
}

impl Message {
    /// Build a fresh user message with a generated id and current timestamp.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            tool_call_id: None,
            tool_calls: None,
            token_usage: None,
        }
    }
}

/// Aggregate usage for a [`Chat`] (spec §3). Stored as a denormalized cache; recomputed
/// from `messages` on load (spec §4.1 "Token accounting", §8 "Usage consistency").
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Sum of every message's prompt tokens.
    pub total_prompt_tokens: u64,
    /// Sum of every message's completion tokens.
    pub total_completion_tokens: u64,
    /// `total_prompt_tokens + total_completion_tokens`.
    pub total_tokens: u64,
    /// Sum of every message's cost.
    pub total_cost: Decimal,
}

impl Usage {
    /// Recompute aggregate usage from a message list (spec §8 "Usage consistency").
    #[must_use]
    pub fn recompute(messages: &[Message]) -> Self {
        let mut usage = Usage::default();
        for message in messages {
            if let Some(accounting) = message.token_usage {
                usage.total_prompt_tokens += accounting.prompt;
                usage.total_completion_tokens += accounting.completion;
                usage.total_tokens += accounting.total;
                usage.total_cost += accounting.cost;
            }
        }
        usage
    }
}

/// A durable, ordered conversation bound to one [`crate::entities::Agent`] and one
/// [`crate::entities::Model`] (spec §3, GLOSSARY "Chat").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Stable identity.
    pub id: String,
    /// Display name; defaults to `"New Chat - <timestamp>"` until the Title Generator
    /// runs (spec §4.1 "Title generation").
    pub name: String,
    /// Bound agent.
    pub agent_id: String,
    /// Bound model.
    pub model_id: String,
    /// Strictly append-only within a turn (spec §3 invariant).
    pub messages: Vec<Message>,
    /// Denormalized aggregate; recomputed on load.
    pub usage: Usage,
    /// Whether this chat is still listed by `list_active_chats`.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// `true` once at least one `(user, assistant-text)` exchange has completed — the
    /// Title Generator's precondition (spec §4.1, §4.7).
    #[must_use]
    pub fn has_completed_exchange(&self) -> bool {
        let has_user = self.messages.iter().any(|m| m.role == MessageRole::User);
        let has_assistant_text = self
            .messages
            .iter()
            .any(|m| m.role == MessageRole::Assistant && m.tool_calls.is_none());
        has_user && has_assistant_text
    }

    /// The default chat name used until the Title Generator runs or fails (spec §4.1).
    #[must_use]
    pub fn default_name(now: DateTime<Utc>) -> String {
        format!("New Chat - {}", now.format("%Y-%m-%d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_recompute_sums_token_accounting() {
        let mut messages = vec![Message::user("hi")];
        messages.push(Message {
            id: "a1".into(),
            role: MessageRole::Assistant,
            content: "hello".into(),
            timestamp: Utc::now(),
            tool_call_id: None,
            tool_calls: None,
            token_usage: Some(TokenAccounting {
                prompt: 10,
                completion: 5,
                total: 15,
                cost: Decimal::new(3, 3),
            }),
        });
        let usage = Usage::recompute(&messages);
        assert_eq!(usage.total_prompt_tokens, 10);
        assert_eq!(usage.total_completion_tokens, 5);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn default_name_has_prefix() {
        let name = Chat::default_name(Utc::now());
        assert!(name.starts_with("New Chat - "));
    }
}
