#![deny(missing_docs)]
//! OpenAI-compatible `/chat/completions` adapter for [`chorus_provider::Provider`],
//! shared by `ollama`, `xai`, `deepseek`, `groq`, `together`, `mistral`, and `generic`
//! (spec §4.2; DESIGN.md "Open Questions" resolves these seven provider types to one
//! parameterized adapter rather than seven near-identical crates, since they all expose
//! an OpenAI-shaped `/chat/completions` surface in production).

mod types;

use async_trait::async_trait;
use chorus_core::ProviderType;
use chorus_provider::{
    resolve_api_key, GenerateRequest, GenerateResponse, GenerateUsage, Provider, ProviderError,
    RequestMessage, Role, ToolCallOut,
};
use types::*;

/// Adapter for any OpenAI-compatible `/chat/completions` endpoint.
pub struct CompatProvider {
    api_key: String,
    client: reqwest::Client,
    api_url: String,
}

impl CompatProvider {
    /// Build a provider from a `Provider.base_url`/`api_key_ref`/`provider_type`
    /// (spec §3, §4.2). `ollama` and `generic` tolerate an empty key
    /// (`ProviderType::allows_empty_key`); the others require one.
    pub fn new(
        base_url: &str,
        api_key_ref: &str,
        provider_type: ProviderType,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: resolve_api_key(api_key_ref, provider_type.allows_empty_key())?,
            client: reqwest::Client::new(),
            api_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    fn build_request(&self, request: &GenerateRequest) -> CompatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(CompatMessage {
                role: "system",
                content: Some(request.system_prompt.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for message in &request.messages {
            messages.push(to_compat_message(message));
        }

        let tools = request
            .tools
            .iter()
            .map(|tool| CompatToolDef {
                tool_type: "function",
                function: CompatFunctionDef {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect();

        CompatRequest {
            model: request.model.clone(),
            messages,
            tools,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        }
    }
}

fn to_compat_message(message: &RequestMessage) -> CompatMessage {
    match message.role {
        Role::System => CompatMessage {
            role: "system",
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Role::User => CompatMessage {
            role: "user",
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Role::Tool => CompatMessage {
            role: "tool",
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: message.tool_call_id.clone(),
        },
        Role::Assistant => CompatMessage {
            role: "assistant",
            content: if message.content.is_empty() {
                None
            } else {
                Some(message.content.clone())
            },
            tool_calls: message.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|call| CompatToolCallWire {
                        id: call.id.clone(),
                        call_type: "function",
                        function: CompatFunctionCall {
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

fn parse_response(response: CompatResponse) -> Result<GenerateResponse, ProviderError> {
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
impl Provider for CompatProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let wire_request = self.build_request(&request);
        let mut builder = self.client.post(&self.api_url);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        let http_response = builder
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

        let wire_response: CompatResponse = http_response
            .json()
            .await
            .map_err(|e| ProviderError::ProtocolError(e.to_string()))?;
        parse_response(wire_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_provider::GenerateOptions;

    #[test]
    fn ollama_allows_empty_key() {
        let provider = CompatProvider::new("http://localhost:11434", "", ProviderType::Ollama);
        assert!(provider.is_ok());
    }

    #[test]
    fn groq_rejects_empty_key() {
        let provider = CompatProvider::new("https://api.groq.com/openai/v1", "", ProviderType::Groq);
        assert!(matches!(provider, Err(ProviderError::ConfigError(_))));
    }

    #[test]
    fn api_url_joins_base_and_path() {
        std::env::set_var("CHORUS_TEST_COMPAT_KEY", "key");
        let provider = CompatProvider::new(
            "https://api.groq.com/openai/v1/",
            "#{CHORUS_TEST_COMPAT_KEY}#",
            ProviderType::Groq,
        )
        .unwrap();
        assert_eq!(provider.api_url, "https://api.groq.com/openai/v1/chat/completions");
        std::env::remove_var("CHORUS_TEST_COMPAT_KEY");
    }

    #[test]
    fn build_request_round_trips_tool_calls() {
        let provider = CompatProvider::new("http://localhost:11434", "", ProviderType::Ollama).unwrap();
        let request = GenerateRequest {
            model: "llama3".into(),
            system_prompt: String::new(),
            messages: vec![RequestMessage {
                role: Role::Assistant,
                content: String::new(),
                tool_call_id: None,
                tool_calls: Some(vec![ToolCallOut {
                    id: "1".into(),
                    name: "echo".into(),
                    arguments_json: "{}".into(),
                }]),
            }],
            tools: vec![],
            options: GenerateOptions::default(),
        };
        let wire = provider.build_request(&request);
        assert_eq!(wire.messages[0].role, "assistant");
        assert!(wire.messages[0].tool_calls.is_some());
    }

    #[test]
    fn parses_final_text_response() {
        let wire: CompatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "done", "tool_calls": []}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1}
        }))
        .unwrap();
        let response = parse_response(wire).unwrap();
        assert!(response.is_final());
        assert_eq!(response.assistant_text, "done");
    }
}
