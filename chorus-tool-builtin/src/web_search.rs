//! Web-search tool (spec §4.3 "a web-search tool"): posts a query to a configured
//! search endpoint and returns a flattened list of results.

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use serde::Deserialize;
use std::sync::Arc;

/// Posts a query to `configuration["endpoint"]`, authenticated with
/// `configuration["api_key"]`.
pub struct WebSearchTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
    client: reqwest::Client,
}

fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            name: "query".into(),
            param_type: ParameterType::String,
            required: true,
            description: "the search query".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "max_results".into(),
            param_type: ParameterType::Integer,
            required: false,
            description: "maximum number of results to return".into(),
            r#enum: None,
            items: None,
        },
    ]
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl ToolDyn for WebSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Search the web and return a list of matching page titles, URLs, and snippets."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let endpoint = resolved
            .get("endpoint")
            .ok_or_else(|| CoreError::ConfigError("web_search tool requires an 'endpoint' configuration key".into()))?;

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let query = arguments["query"].as_str().unwrap_or_default();
        let max_results = arguments["max_results"].as_u64().unwrap_or(5);

        let mut request = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({"query": query, "max_results": max_results}));
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
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ProtocolError(e.to_string()))?;

        if parsed.results.is_empty() {
            return Ok("no results".to_string());
        }
        Ok(parsed
            .results
            .into_iter()
            .map(|r| format!("{} — {}\n{}", r.title, r.url, r.snippet))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

/// Builds [`WebSearchTool`] instances.
pub struct WebSearchToolFactory;

impl ToolFactory for WebSearchToolFactory {
    fn tool_type(&self) -> &str {
        "web_search"
    }

    fn config_keys(&self) -> &[&str] {
        &["endpoint", "api_key"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(WebSearchTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
            client: reqwest::Client::new(),
        })
    }
}
