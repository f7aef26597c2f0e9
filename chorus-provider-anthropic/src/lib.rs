#![deny(missing_docs)]
//! Anthropic Messages API adapter for [`chorus_provider::Provider`] (spec §4.2).

mod types;

use async_trait::async_trait;
use chorus_provider::{
    resolve_api_key, GenerateRequest, GenerateResponse, GenerateUsage, Provider, ProviderError,
    RequestMessage, Role, ToolCallOut,
};
use types::*;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Anthropic Messages API adapter.
pub struct AnthropicProvider {
    api_key: String,
    client: reqwest::Client,
    api_url: String,
}

impl AnthropicProvider {
    /// Build a provider from a `Provider.api_key_ref` (spec §3, §4.2). Anthropic never
    /// tolerates an empty key.
    pub fn new(api_key_ref: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: resolve_api_key(api_key_ref, false)?,
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Override the API URL (proxies, tests).
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_request(&self, request: &GenerateRequest) -> AnthropicRequest {
        let messages = request.messages.iter().map(to_anthropic_message).collect();
        let tools = request
            .tools
            .iter()
            .map(|tool| AnthropicToolDef {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.parameters.clone(),
            })
            .collect();

        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages,
            system: if request.system_prompt.is_empty() {
                None
            } else {
                Some(request.system_prompt.clone())
            },
            tools,
            temperature: request.options.temperature,
        }
    }
}

/// Anthropic has no native `tool` role: a tool result is a `user` message carrying a
/// `tool_result` content block referencing the original `tool_use_id`.
fn to_anthropic_message(message: &RequestMessage) -> AnthropicMessage {
    match message.role {
        Role::System | Role::User => AnthropicMessage {
            role: "user",
            content: vec![AnthropicContentBlock::Text {
                text: message.content.clone(),
            }],
        },
        Role::Tool => AnthropicMessage {
            role: "user",
            content: vec![AnthropicContentBlock::ToolResult {
                tool_use_id: message.tool_call_id.clone().unwrap_or_default(),
                content: message.content.clone(),
            }],
        },
        Role::Assistant => {
            let mut content = Vec::new();
            if !message.content.is_empty() {
                content.push(AnthropicContentBlock::Text {
                    text: message.content.clone(),
                });
            }
            if let Some(calls) = &message.tool_calls {
                for call in calls {
                    let input = serde_json::from_str(&call.arguments_json)
                        .unwrap_or(serde_json::Value::Object(Default::default()));
                    content.push(AnthropicContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input,
                    });
                }
            }
            AnthropicMessage {
                role: "assistant",
                content,
            }
        }
    }
}

fn parse_response(response: AnthropicResponse) -> GenerateResponse {
    let mut assistant_text = String::new();
    let mut tool_calls = Vec::new();
    for block in response.content {
        match block {
            AnthropicResponseBlock::Text { text } => assistant_text.push_str(&text),
            AnthropicResponseBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCallOut {
                    id,
                    name,
                    arguments_json: serde_json::to_string(&input).unwrap_or_default(),
                });
            }
            AnthropicResponseBlock::Other => {}
        }
    }
    GenerateResponse {
        assistant_text,
        tool_calls,
        usage: GenerateUsage {
            prompt: response.usage.input_tokens,
            completion: response.usage.output_tokens,
        },
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let wire_request = self.build_request(&request);
        let http_response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        let status = http_response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthError(error_message(http_response).await));
        }
        if status.is_client_error() {
            return Err(ProviderError::BadRequest(error_message(http_response).await));
        }
        if status.is_server_error() {
            return Err(ProviderError::Transient(error_message(http_response).await));
        }

        let wire_response: AnthropicResponse = http_response
            .json()
            .await
            .map_err(|e| ProviderError::ProtocolError(e.to_string()))?;
        Ok(parse_response(wire_response))
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<AnthropicErrorBody>().await {
        Ok(body) => body
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {status}")),
        Err(_) => format!("HTTP {status}"),
    }
}
