#![deny(missing_docs)]
//! OpenAI Chat Completions adapter for [`chorus_provider::Provider`] (spec §4.2).

mod types;

use async_trait::async_trait;
use chorus_provider::{
    resolve_api_key, GenerateRequest, GenerateResponse, GenerateUsage, Provider, ProviderError,
    RequestMessage, Role, ToolCallOut,
};
use types::*;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI Chat Completions adapter.
pub struct OpenAiProvider {
    api_key: String,
    client: reqwest::Client,
    api_url: String,
}

impl OpenAiProvider {
    /// Build a provider from a `Provider.api_key_ref` (spec §3, §4.2). OpenAI never
    /// tolerates an empty key (spec §4.2: only `ollama`/`generic` do).
    pub fn new(api_key_ref: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: resolve_api_key(api_key_ref, false)?,
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Override the API URL (proxies, self-hosted-compatible gateways, tests).
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn build_request(&self, request: &GenerateRequest) -> OpenAiRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(OpenAiMessage {
                role: "system",
                content: Some(request.system_prompt.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for message in &request.messages {
            messages.push(to_openai_message(message));
        }

        let tools = request
            .tools
            .iter()
            .map(|tool| OpenAiToolDef {
                tool_type: "function",
                function: OpenAiFunctionDef {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect();

        OpenAiRequest {
            model: request.model.clone(),
            messages,
            tools,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            reasoning_effort: request.options.reasoning_effort.clone(),
        }
    }
}

fn to_openai_message(message: &RequestMessage) -> OpenAiMessage {
    match message.role {
        Role::System => OpenAiMessage {
            role: "system",
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Role::User => OpenAiMessage {
            role: "user",
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Role::Tool => OpenAiMessage {
            role: "tool",
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: message.tool_call_id.clone(),
        },
        Role::Assistant => OpenAiMessage {
            role: "assistant",
            content: if message.content.is_empty() {
                None
            } else {
                Some(message.content.clone())
            },
            tool_calls: message.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|call| OpenAiToolCallWire {
                        id: call.id.clone(),
                        call_type: "function",
                        function: OpenAiFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments_json.clone(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: None,
        },
    }
}

fn parse_response(response: OpenAiResponse) -> Result<GenerateResponse, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ProtocolError("no choices in response".into()))?;
    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| ToolCallOut {
            id: call.id,
            name: call.function.name,
            arguments_json: call.function.arguments,
        })
        .collect();
    Ok(GenerateResponse {
        assistant_text: choice.message.content.unwrap_or_default(),
        tool_calls,
        usage: GenerateUsage {
            prompt: response.usage.prompt_tokens,
            completion: response.usage.completion_tokens,
        },
    })
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let wire_request = self.build_request(&request);
        let http_response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(e.to_string()))?;

        let status = http_response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = http_response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthError(body));
        }
        if status.is_client_error() {
            let body = http_response.text().await.unwrap_or_default();
            return Err(ProviderError::BadRequest(format!("HTTP {status}: {body}")));
        }
        if status.is_server_error() {
            let body = http_response.text().await.unwrap_or_default();
            return Err(ProviderError::Transient(format!("HTTP {status}: {body}")));
        }

        let wire_response: OpenAiResponse = http_response
            .json()
            .await
            .map_err(|e| ProviderError::ProtocolError(e.to_string()))?;
        parse_response(wire_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_provider::{build_tool_schema, GenerateOptions};
    use chorus_core::{Parameter, ParameterType};

    #[test]
    fn build_request_prepends_system_prompt() {
        std::env::set_var("CHORUS_TEST_OPENAI_KEY", "sk-test");
        let provider = OpenAiProvider::new("#{CHORUS_TEST_OPENAI_KEY}#").unwrap();
        let request = GenerateRequest {
            model: "gpt-4o".into(),
            system_prompt: "be helpful".into(),
            messages: vec![RequestMessage {
                role: Role::User,
                content: "hi".into(),
                tool_call_id: None,
                tool_calls: None,
            }],
            tools: vec![],
            options: GenerateOptions::default(),
        };
        let wire = provider.build_request(&request);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content.as_deref(), Some("be helpful"));
        assert_eq!(wire.messages[1].role, "user");
        std::env::remove_var("CHORUS_TEST_OPENAI_KEY");
    }

    #[test]
    fn build_request_maps_tool_schema() {
        std::env::set_var("CHORUS_TEST_OPENAI_KEY2", "sk-test");
        let provider = OpenAiProvider::new("#{CHORUS_TEST_OPENAI_KEY2}#").unwrap();
        let schema = build_tool_schema(
            "file_read",
            "read a file",
            &[Parameter {
                name: "path".into(),
                param_type: ParameterType::String,
                required: true,
                description: "path".into(),
                r#enum: None,
                items: None,
            }],
        );
        let request = GenerateRequest {
            model: "gpt-4o".into(),
            system_prompt: String::new(),
            messages: vec![],
            tools: vec![schema],
            options: GenerateOptions::default(),
        };
        let wire = provider.build_request(&request);
        assert_eq!(wire.tools.len(), 1);
        assert_eq!(wire.tools[0].function.name, "file_read");
        std::env::remove_var("CHORUS_TEST_OPENAI_KEY2");
    }

    #[test]
    fn parses_tool_call_response() {
        let wire: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {"name": "file_read", "arguments": "{\"path\":\"/etc/hostname\"}"}
                    }]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4}
        }))
        .unwrap();
        let response = parse_response(wire).unwrap();
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "file_read");
        assert_eq!(response.usage.prompt, 10);
        assert!(!response.is_final());
    }

    #[test]
    fn empty_choices_is_protocol_error() {
        let wire: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [],
            "usage": {"prompt_tokens": 0, "completion_tokens": 0}
        }))
        .unwrap();
        let err = parse_response(wire).unwrap_err();
        assert!(matches!(err, ProviderError::ProtocolError(_)));
    }
}
