//! Title Generator (spec §4.7).
//!
//! Synthesizes a short title from a chat's first `(user, assistant-text)` exchange by
//! calling the Provider Client once with a fixed system instruction and no tools.
//! Never raises outward — failures are logged and the chat keeps its default name
//! (spec §4.1 "Title generation", §4.7).

use chorus_core::Message;
use chorus_provider::{GenerateOptions, GenerateRequest, Provider, RequestMessage, Role};
use std::sync::Arc;

const TITLE_SYSTEM_PROMPT: &str =
    "Produce a short title (at most 60 characters) that summarizes this conversation. \
     Reply with the title text only, no quotes, no punctuation at the end.";
const MAX_TITLE_LEN: usize = 60;

/// Generates chat titles by a one-shot, zero-tool call on the same Provider path as
/// the chat loop (spec §4.7).
pub struct TitleGenerator;

impl TitleGenerator {
    /// Synthesize a title from the first user message and first assistant text
    /// message of a chat. Returns `None` on any failure — the caller retains the
    /// chat's default name and logs at `warn` (spec §4.1, §4.7).
    pub async fn generate(
        provider: &Arc<dyn Provider>,
        model_name: &str,
        user_message: &Message,
        assistant_message: &Message,
    ) -> Option<String> {
        let request = GenerateRequest {
            model: model_name.to_string(),
            system_prompt: TITLE_SYSTEM_PROMPT.to_string(),
            messages: vec![
                RequestMessage {
                    role: Role::User,
                    content: user_message.content.clone(),
                    tool_call_id: None,
                    tool_calls: None,
                },
                RequestMessage {
                    role: Role::Assistant,
                    content: assistant_message.content.clone(),
                    tool_call_id: None,
                    tool_calls: None,
                },
            ],
            tools: vec![],
            options: GenerateOptions {
                temperature: Some(0.7),
                max_tokens: Some(64),
                reasoning_effort: None,
            },
        };

        match provider.generate(request).await {
            Ok(response) => {
                let title = response.assistant_text.trim();
                if title.is_empty() {
                    tracing::warn!("title generator returned empty text, keeping default name");
                    None
                } else {
                    Some(truncate_title(title))
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "title generation failed, keeping default name");
                None
            }
        }
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_LEN {
        title.to_string()
    } else {
        title.chars().take(MAX_TITLE_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chorus_provider::{GenerateResponse, GenerateUsage, ProviderError};

    struct StubProvider {
        text: String,
    }

    #[async_trait]
    impl Provider for StubProvider {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
            Ok(GenerateResponse {
                assistant_text: self.text.clone(),
                tool_calls: vec![],
                usage: GenerateUsage::default(),
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
            Err(ProviderError::Transient("boom".into()))
        }
    }

    fn message(content: &str) -> Message {
        Message::user(content)
    }

    #[tokio::test]
    async fn returns_trimmed_title_on_success() {
        let provider: Arc<dyn Provider> = Arc::new(StubProvider { text: "  Weather in Paris  ".into() });
        let title = TitleGenerator::generate(&provider, "gpt-4o", &message("hi"), &message("hello"))
            .await
            .unwrap();
        assert_eq!(title, "Weather in Paris");
    }

    #[tokio::test]
    async fn truncates_titles_over_60_chars() {
        let long = "x".repeat(100);
        let provider: Arc<dyn Provider> = Arc::new(StubProvider { text: long });
        let title = TitleGenerator::generate(&provider, "gpt-4o", &message("hi"), &message("hello"))
            .await
            .unwrap();
        assert_eq!(title.chars().count(), 60);
    }

    #[tokio::test]
    async fn returns_none_on_provider_failure() {
        let provider: Arc<dyn Provider> = Arc::new(FailingProvider);
        let title = TitleGenerator::generate(&provider, "gpt-4o", &message("hi"), &message("hello")).await;
        assert!(title.is_none());
    }

    #[tokio::test]
    async fn returns_none_on_empty_text() {
        let provider: Arc<dyn Provider> = Arc::new(StubProvider { text: "   ".into() });
        let title = TitleGenerator::generate(&provider, "gpt-4o", &message("hi"), &message("hello")).await;
        assert!(title.is_none());
    }
}
