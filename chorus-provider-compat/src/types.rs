//! Wire types for the OpenAI-compatible `/chat/completions` dialect shared by
//! `ollama`/`xai`/`deepseek`/`groq`/`together`/`mistral`/`generic` (spec §4.2, DESIGN.md
//! "Open Questions").

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct CompatMessage {
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<CompatToolCallWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatToolCallWire {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: &'static str,
    pub function: CompatFunctionCall,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatFunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatToolDef {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: CompatFunctionDef,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatRequest {
    pub model: String,
    pub messages: Vec<CompatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<CompatToolDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompatResponse {
    pub choices: Vec<CompatChoice>,
    #[serde(default)]
    pub usage: CompatUsage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompatChoice {
    pub message: CompatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<CompatResponseToolCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompatResponseToolCall {
    pub id: String,
    pub function: CompatResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompatResponseFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}
