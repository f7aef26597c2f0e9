//! HTTP-fetch tool (spec §4.3 "an HTTP-fetch tool"): retrieves a URL and returns its
//! body, truncated to a sane size for the model's context window.

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use std::sync::Arc;

const MAX_BODY_BYTES: usize = 50_000;

/// Fetches a URL over HTTP GET.
pub struct HttpFetchTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
    client: reqwest::Client,
}

fn parameters() -> Vec<Parameter> {
    vec![Parameter {
        name: "url".into(),
        param_type: ParameterType::String,
        required: true,
        description: "the URL to fetch".into(),
        r#enum: None,
        items: None,
    }]
}

#[async_trait]
impl ToolDyn for HttpFetchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Fetch a URL over HTTP GET and return its body text."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let url = arguments["url"].as_str().unwrap_or_default();

        let mut request = self.client.get(url);
        if let Some(header) = resolved.get("authorization") {
            request = request.header("Authorization", header);
        }
        let response = request
            .send()
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::ProtocolError(e.to_string()))?;
        if !status.is_success() {
            return Err(CoreError::Internal(format!("HTTP {status}: {body}")));
        }
        if body.len() > MAX_BODY_BYTES {
            let boundary = (0..=MAX_BODY_BYTES).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
            Ok(format!(
                "{}... [truncated, {} bytes total]",
                &body[..boundary],
                body.len()
            ))
        } else {
            Ok(body)
        }
    }
}

/// Builds [`HttpFetchTool`] instances.
pub struct HttpFetchToolFactory;

impl ToolFactory for HttpFetchToolFactory {
    fn tool_type(&self) -> &str {
        "http_fetch"
    }

    fn config_keys(&self) -> &[&str] {
        &["authorization"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(HttpFetchTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
            client: reqwest::Client::new(),
        })
    }
}
