//! Normalized request/response shapes exchanged with a [`crate::Provider`] (spec §4.2).

use chorus_core::{Parameter, ParameterType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `role` of a [`RequestMessage`] on the wire into a provider (spec §6 abstract request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user message.
    User,
    /// Model-authored message, optionally carrying tool calls.
    Assistant,
    /// A tool execution result, carrying `tool_call_id`.
    Tool,
}

/// One tool call a prior assistant message requested; echoed back on the `Tool` message
/// that carries its result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRef {
    /// Id assigned by the provider to the original tool call.
    pub id: String,
    /// Tool name that was invoked.
    pub name: String,
}

/// A message in the normalized request sent to a [`crate::Provider`] (spec §4.2, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Message role.
    pub role: Role,
    /// Text content. For `Tool` messages, the tool's result (or `"error: ..."`).
    pub content: String,
    /// Present on `Tool` messages; matches a prior assistant tool call's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Present on `Assistant` messages that requested tool execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallOut>>,
}

/// One tool call emitted by the model in a [`GenerateResponse`] (spec §4.2, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallOut {
    /// Provider-assigned id for this call; echoed back by the matching tool message.
    pub id: String,
    /// Tool name to invoke.
    pub name: String,
    /// Raw JSON-encoded arguments, as emitted by the provider.
    pub arguments_json: String,
}

/// JSON-Schema-subset description of a tool, built from the Tool Registry's parameter
/// list (spec §4.3 "Parameter schema export").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// Human-readable description surfaced to the model.
    pub description: String,
    /// JSON Schema object: `{"type": "object", "properties": {...}, "required": [...]}`.
    pub parameters: Value,
}

/// Build the JSON-Schema-subset payload for one [`Parameter`] (spec §4.3).
fn parameter_schema(param: &Parameter) -> Value {
    let mut schema = serde_json::Map::new();
    schema.insert("type".into(), Value::String(parameter_type_name(param.param_type).into()));
    schema.insert("description".into(), Value::String(param.description.clone()));
    if let Some(values) = &param.r#enum {
        schema.insert("enum".into(), Value::Array(values.iter().cloned().map(Value::String).collect()));
    }
    if let Some(items) = &param.items {
        schema.insert("items".into(), parameter_schema(items));
    }
    Value::Object(schema)
}

fn parameter_type_name(ty: ParameterType) -> &'static str {
    match ty {
        ParameterType::String => "string",
        ParameterType::Integer => "integer",
        ParameterType::Number => "number",
        ParameterType::Boolean => "boolean",
        ParameterType::Array => "array",
        ParameterType::Object => "object",
    }
}

/// Build a [`ToolSchema`] from a tool's name, description, and declared parameters.
#[must_use]
pub fn build_tool_schema(name: &str, description: &str, parameters: &[Parameter]) -> ToolSchema {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in parameters {
        properties.insert(param.name.clone(), parameter_schema(param));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }
    ToolSchema {
        name: name.to_string(),
        description: description.to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
        }),
    }
}

/// Sampling/decoding options drawn from the Model (spec §4.1 step 3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature. Spec default: 0.7 (§4.1, §9).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum output tokens. Spec default: 0.25 × `context_window` (§4.1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Provider-specific reasoning-effort hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
}

/// The normalized request a [`crate::Provider`] consumes (spec §4.2, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model-native identifier to invoke (`Model::model_name`).
    pub model: String,
    /// Agent system prompt, sent as the provider's native system-instruction channel.
    pub system_prompt: String,
    /// Conversation history, oldest first, already pruned to fit the context window
    /// (spec §4.1 step 3).
    pub messages: Vec<RequestMessage>,
    /// Tool schemas synthesized from the agent's tools.
    pub tools: Vec<ToolSchema>,
    /// Decoding options.
    pub options: GenerateOptions,
}

/// Token usage reported by a single provider call (spec §3 `TokenAccounting`, §4.1).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenerateUsage {
    /// Prompt/input tokens charged for this call.
    pub prompt: u64,
    /// Completion/output tokens charged for this call.
    pub completion: u64,
}

/// The normalized response a [`crate::Provider`] produces (spec §4.2, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Assistant text. May be non-empty alongside `tool_calls` (interim narration);
    /// spec §4.1 step 4b.
    pub assistant_text: String,
    /// Tool calls the model requested, if any.
    pub tool_calls: Vec<ToolCallOut>,
    /// Token usage for this call.
    pub usage: GenerateUsage,
}

impl GenerateResponse {
    /// `true` when the model requested no tool execution and this is a final answer
    /// (spec §4.1 step 4c).
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Cost of one provider call, given its usage and the Provider's published pricing for
/// the invoked model (spec §4.1 "Token accounting").
#[must_use]
pub fn compute_cost(usage: GenerateUsage, input_price_per_mille: Decimal, output_price_per_mille: Decimal) -> Decimal {
    let million = Decimal::from(1_000_000u64);
    (Decimal::from(usage.prompt) * input_price_per_mille
        + Decimal::from(usage.completion) * output_price_per_mille)
        / million
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::Parameter;

    #[test]
    fn build_tool_schema_marks_required_and_array_items() {
        let parameters = vec![
            Parameter {
                name: "task".into(),
                param_type: ParameterType::String,
                required: true,
                description: "the task".into(),
                r#enum: None,
                items: None,
            },
            Parameter {
                name: "tools".into(),
                param_type: ParameterType::Array,
                required: false,
                description: "override tools".into(),
                r#enum: None,
                items: Some(Box::new(Parameter {
                    name: "tool".into(),
                    param_type: ParameterType::String,
                    required: false,
                    description: String::new(),
                    r#enum: None,
                    items: None,
                })),
            },
        ];
        let schema = build_tool_schema("sub_agent", "delegate a task", &parameters);
        assert_eq!(schema.parameters["required"], serde_json::json!(["task"]));
        assert_eq!(schema.parameters["properties"]["tools"]["items"]["type"], "string");
    }

    #[test]
    fn compute_cost_scales_by_million() {
        let usage = GenerateUsage {
            prompt: 1_000_000,
            completion: 500_000,
        };
        let cost = compute_cost(usage, Decimal::new(3, 0), Decimal::new(15, 0));
        assert_eq!(cost, Decimal::new(3, 0) + Decimal::new(15, 0) / Decimal::new(2, 0));
    }

    #[test]
    fn is_final_without_tool_calls() {
        let response = GenerateResponse {
            assistant_text: "hi".into(),
            tool_calls: vec![],
            usage: GenerateUsage::default(),
        };
        assert!(response.is_final());
    }
}
