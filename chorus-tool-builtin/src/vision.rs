//! Vision tool (spec §4.3 "a vision tool"): posts an image URL plus a question to a
//! configured vision endpoint and returns the model's description.

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use serde::Deserialize;
use std::sync::Arc;

/// Posts `{image_url, question}` to `configuration["endpoint"]`, authenticated with
/// `configuration["api_key"]`.
pub struct VisionTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
    client: reqwest::Client,
}

fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            name: "image_url".into(),
            param_type: ParameterType::String,
            required: true,
            description: "URL of the image to analyze".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "question".into(),
            param_type: ParameterType::String,
            required: false,
            description: "what to ask about the image; defaults to a general description".into(),
            r#enum: None,
            items: None,
        },
    ]
}

#[derive(Deserialize)]
struct VisionResponse {
    description: String,
}

#[async_trait]
impl ToolDyn for VisionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Analyze an image and answer a question about it, or describe it generally."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let endpoint = resolved
            .get("endpoint")
            .ok_or_else(|| CoreError::ConfigError("vision tool requires an 'endpoint' configuration key".into()))?;

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let image_url = arguments["image_url"].as_str().unwrap_or_default();
        let question = arguments["question"]
            .as_str()
            .unwrap_or("describe this image");

        let mut request = self.client.post(endpoint).json(&serde_json::json!({
            "image_url": image_url,
            "question": question,
        }));
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
        let parsed: VisionResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ProtocolError(e.to_string()))?;
        Ok(parsed.description)
    }
}

/// Builds [`VisionTool`] instances.
pub struct VisionToolFactory;

impl ToolFactory for VisionToolFactory {
    fn tool_type(&self) -> &str {
        "vision"
    }

    fn config_keys(&self) -> &[&str] {
        &["endpoint", "api_key"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(VisionTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
            client: reqwest::Client::new(),
        })
    }
}
