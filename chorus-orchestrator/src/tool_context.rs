//! Carries the calling chat's id and recursion depth alongside a tool call's own
//! arguments, so a tool — the Sub-Agent Tool in particular — can recognize which chat
//! invoked it and how deep the delegation chain already runs (spec §4.4 "a depth
//! counter threaded through the orchestration context").
//!
//! [`ToolDyn::execute`](chorus_tool::ToolDyn::execute) takes only the raw arguments
//! JSON (spec §4.3), so this context rides along as a reserved object key rather than
//! a second parameter — [`chorus_tool::validate_arguments`] already tolerates unknown
//! keys, so every other tool simply never looks at it.

use serde_json::{Map, Value};

const CONTEXT_KEY: &str = "__chorus_orchestration";

/// What a tool needs to know about the turn invoking it, beyond its own arguments.
#[derive(Debug, Clone)]
pub struct OrchestrationContext {
    /// The chat this tool call was made from.
    pub chat_id: String,
    /// The calling turn's sub-agent recursion depth (spec §4.4).
    pub depth: u32,
}

/// Merge the calling chat's id and depth into a tool call's arguments JSON under a
/// reserved key, leaving every declared argument untouched.
#[must_use]
pub fn with_orchestration_context(arguments_json: &str, chat_id: &str, depth: u32) -> String {
    let mut value: Value = serde_json::from_str(arguments_json).unwrap_or(Value::Object(Map::new()));
    if !value.is_object() {
        value = Value::Object(Map::new());
    }
    if let Value::Object(map) = &mut value {
        map.insert(
            CONTEXT_KEY.to_string(),
            serde_json::json!({ "chat_id": chat_id, "depth": depth }),
        );
    }
    value.to_string()
}

/// Read back the orchestration context a prior [`with_orchestration_context`] call
/// embedded in `arguments_json`. Returns `None` if the reserved key is missing or
/// malformed (e.g. a tool invoked directly in a test, outside the chat loop).
#[must_use]
pub fn read_orchestration_context(arguments_json: &str) -> Option<OrchestrationContext> {
    let value: Value = serde_json::from_str(arguments_json).ok()?;
    let context = value.get(CONTEXT_KEY)?;
    let chat_id = context.get("chat_id")?.as_str()?.to_string();
    let depth = context.get("depth")?.as_u64()?;
    Some(OrchestrationContext { chat_id, depth: u32::try_from(depth).ok()? })
}
