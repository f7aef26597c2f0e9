//! History pruning to fit a Model's context window (spec §4.1 step 3).
//!
//! "Pruned to fit `model.contextWindow` via oldest-first dropping, never dropping the
//! system message or the most recent user message." Token counting at this layer is
//! approximate (the real count is only known after the provider responds with usage,
//! spec §4.1 "Token accounting") — a 4-characters-per-token heuristic, the same order
//! of magnitude every provider's own public guidance uses.

use chorus_core::{Message, MessageRole};

const CHARS_PER_TOKEN: usize = 4;

fn estimate_tokens(message: &Message) -> u64 {
    (message.content.len() / CHARS_PER_TOKEN).max(1) as u64
}

/// Drop oldest non-pinned messages until the remaining history's estimated token
/// count fits `context_window`, never dropping a `system` message or the most recent
/// `user` message (spec §4.1 step 3).
#[must_use]
pub fn prune_history(messages: Vec<Message>, context_window: u64) -> Vec<Message> {
    if messages.is_empty() {
        return messages;
    }

    let mut total: u64 = messages.iter().map(estimate_tokens).sum();
    if total <= context_window {
        return messages;
    }

    let mut pruned = messages;
    let mut cursor = 0;
    while total > context_window && cursor < pruned.len() {
        let last_user_index = pruned.iter().rposition(|m| m.role == MessageRole::User);
        let is_system = pruned[cursor].role == MessageRole::System;
        let is_last_user = Some(cursor) == last_user_index;
        if is_system || is_last_user {
            cursor += 1;
            continue;
        }
        let removed = pruned.remove(cursor);
        total -= estimate_tokens(&removed);
    }
    pruned
}
