//! Provider, Model, Agent, Tool, and Parameter entities (spec §3).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The wire dialect a [`Provider`] speaks. `Generic` and `Ollama` tolerate an empty
/// `api_key_ref` (spec §4.2); the remaining OpenAI-compatible dialects are served by
/// `chorus-provider-compat` (see DESIGN.md, "Open Questions").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// OpenAI's native API.
    OpenAi,
    /// Anthropic's native API.
    Anthropic,
    /// Google Gemini.
    Google,
    /// xAI Grok.
    Xai,
    /// DeepSeek.
    DeepSeek,
    /// A locally-hosted Ollama instance.
    Ollama,
    /// Groq.
    Groq,
    /// Together AI.
    Together,
    /// Mistral.
    Mistral,
    /// Any OpenAI-compatible endpoint with no dedicated adapter.
    Generic,
    /// A deployment-local provider with no external catalog entry at all (e.g. a
    /// fixture/test harness model). Never billed, never refreshed from the canonical
    /// catalog (spec §4.6 step 2).
    Internal,
}

impl ProviderType {
    /// `true` for provider types that tolerate an empty `api_key_ref` (spec §4.2).
    #[must_use]
    pub fn allows_empty_key(self) -> bool {
        matches!(self, ProviderType::Ollama | ProviderType::Generic | ProviderType::Internal)
    }

    /// `true` for provider types served by the dedicated OpenAI/Anthropic adapters rather
    /// than the shared OpenAI-compatible adapter.
    #[must_use]
    pub fn has_dedicated_adapter(self) -> bool {
        matches!(self, ProviderType::OpenAi | ProviderType::Anthropic)
    }
}

/// Per-model pricing and limits, as published by a [`Provider`] (spec §3, §4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// The provider-native model identifier (e.g. `"gpt-4o-2024-05-13"`).
    pub name: String,
    /// Price per million input tokens.
    pub input_price_per_mille: Decimal,
    /// Price per million output tokens.
    pub output_price_per_mille: Decimal,
    /// Maximum context window, in tokens.
    pub context_window: u64,
}

/// A configured upstream model provider (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Stable identity.
    pub id: String,
    /// Wire dialect.
    pub provider_type: ProviderType,
    /// Human-readable name.
    pub display_name: String,
    /// Base URL of the provider's API.
    pub base_url: String,
    /// Name of the environment variable holding the API key, or a literal key. May be
    /// empty when `provider_type.allows_empty_key()`.
    pub api_key_ref: String,
    /// Published pricing/limits, one entry per model this provider serves.
    pub model_pricing: Vec<ModelPricing>,
}

impl Provider {
    /// Look up this provider's pricing entry for a given provider-native model name.
    #[must_use]
    pub fn pricing_for(&self, model_name: &str) -> Option<&ModelPricing> {
        self.model_pricing.iter().find(|p| p.name == model_name)
    }
}

/// Capability flags used by the Model Filter (spec §4.8) and orchestration gating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Model family, e.g. `"o"` for OpenAI's reasoning-only family.
    pub family: Option<String>,
    /// `true` if the model supports extended/chain-of-thought reasoning.
    pub reasoning: bool,
    /// `true` if the model can emit tool calls.
    pub tool_call: bool,
    /// `true` if the model accepts a `temperature` parameter.
    pub temperature_cap: bool,
    /// `true` if the model accepts file/image attachments.
    pub attachment: bool,
    /// `true` if the model supports a constrained structured-output mode.
    pub structured_output: bool,
}

/// An inference configuration bound to one [`Provider`] (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Stable identity.
    pub id: String,
    /// Human-readable display name (see `chorus_catalog::display_name`).
    pub name: String,
    /// The owning [`Provider`]'s id.
    pub provider_id: String,
    /// Denormalized from the Provider; must match `Provider::provider_type` (spec §3).
    pub provider_type: ProviderType,
    /// The provider-native model identifier; must appear in the Provider's
    /// `model_pricing` (spec §3).
    pub model_name: String,
    /// Sampling temperature override.
    pub temperature: Option<f64>,
    /// Max output tokens override.
    pub max_tokens: Option<u64>,
    /// Context window override; falls back to the Provider's pricing entry when unset.
    pub context_window: Option<u64>,
    /// Reasoning effort hint (provider-specific free text, e.g. `"medium"`).
    pub reasoning_effort: Option<String>,
    /// Capability flags.
    pub capabilities: Capabilities,
}

impl Model {
    /// `true` unless `capabilities.tool_call = false`, in which case the model is
    /// excluded from chat orchestration (spec §3 invariant).
    #[must_use]
    pub fn usable_in_orchestration(&self) -> bool {
        self.capabilities.tool_call
    }
}

/// The JSON-Schema-subset parameter types a [`Tool`] parameter may declare (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// UTF-8 string.
    String,
    /// Signed integer.
    Integer,
    /// Floating point.
    Number,
    /// Boolean.
    Boolean,
    /// Ordered list; carries an `items` descriptor in the exported schema.
    Array,
    /// Nested object.
    Object,
}

/// One declared parameter of a [`Tool`] (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, as it appears in the tool-call arguments JSON.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Whether the provider-facing schema marks this parameter as required.
    pub required: bool,
    /// Human-readable description surfaced in the function-schema payload.
    pub description: String,
    /// Allowed literal values, if the parameter is an enum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<String>>,
    /// Element type descriptor, required when `param_type == Array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Parameter>>,
}

/// A registered, invokable tool value object (spec §3). Tool instances never mutate
/// after construction (spec §9, "Tool dynamism").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool name, as referenced by `Agent::tools` and tool-call requests.
    pub name: String,
    /// Human-readable description surfaced to the model.
    pub description: String,
    /// Declared parameter schema.
    pub parameters: Vec<Parameter>,
    /// Configuration map; values may contain `#{ENV_NAME}#` placeholders (spec §4.3).
    pub configuration: HashMap<String, String>,
}

/// A behavior configuration: system prompt plus an allow-list of tool names (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identity.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// System prompt prepended to every chat using this agent.
    pub system_prompt: String,
    /// Names of tools this agent may invoke; each must resolve in the Tool Registry at
    /// turn start, or the turn fails fatally (spec §3 invariant).
    pub tools: Vec<String>,
}
