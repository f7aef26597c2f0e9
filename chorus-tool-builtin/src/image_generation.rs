//! Image-generation tool (spec §4.3 "an image-generation tool"): posts a prompt to a
//! configured image-generation endpoint and returns the resulting image URL.

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use serde::Deserialize;
use std::sync::Arc;

/// Posts a prompt to `configuration["endpoint"]`, authenticated with
/// `configuration["api_key"]`.
pub struct ImageGenerationTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
    client: reqwest::Client,
}

fn parameters() -> Vec<Parameter> {
    vec![Parameter {
        name: "prompt".into(),
        param_type: ParameterType::String,
        required: true,
        description: "description of the image to generate".into(),
        r#enum: None,
        items: None,
    }]
}

#[derive(Deserialize)]
struct ImageResponse {
    url: String,
}

#[async_trait]
impl ToolDyn for ImageGenerationTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Generate an image from a text prompt and return its URL."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let endpoint = resolved.get("endpoint").ok_or_else(|| {
            CoreError::ConfigError("image_generation tool requires an 'endpoint' configuration key".into())
        })?;

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let prompt = arguments["prompt"].as_str().unwrap_or_default();

        let mut request = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({"prompt": prompt}));
        if let Some(api_key) = resolved.get("api_key") {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Internal(format!("HTTP {status}: {body}")));
        }
        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ProtocolError(e.to_string()))?;
        Ok(parsed.url)
    }
}

/// Builds [`ImageGenerationTool`] instances.
pub struct ImageGenerationToolFactory;

impl ToolFactory for ImageGenerationToolFactory {
    fn tool_type(&self) -> &str {
        "image_generation"
    }

    fn config_keys(&self) -> &[&str] {
        &["endpoint", "api_key"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(ImageGenerationTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
            client: reqwest::Client::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_endpoint_is_config_error() {
        let tool = ImageGenerationTool {
            name: "image_generation".into(),
            configuration: Default::default(),
            parameters: parameters(),
            client: reqwest::Client::new(),
        };
        let err = tool
            .execute(r#"{"prompt": "a red fox in snow"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConfigError(_)));
    }

    #[tokio::test]
    async fn rejects_missing_prompt() {
        let mut configuration = std::collections::HashMap::new();
        configuration.insert("endpoint".to_string(), "https://example.invalid/images".into());
        let tool = ImageGenerationTool {
            name: "image_generation".into(),
            configuration,
            parameters: parameters(),
            client: reqwest::Client::new(),
        };
        let err = tool.execute("{}").await.unwrap_err();
        assert!(matches!(err, CoreError::ToolArgumentError(_)));
    }
}
