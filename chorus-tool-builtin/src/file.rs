//! Filesystem tool: read, write, and append text files under a configured root
//! (spec §4.3 "a file/filesystem tool"). Grounded on the shell-sandbox posture of
//! `sven-tools`' builtin tools (reference pack, `swedishembedded-sven`).

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads, writes, or appends to a file under `configuration["root"]`.
pub struct FileTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
}

fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            name: "operation".into(),
            param_type: ParameterType::String,
            required: true,
            description: "read, write, or append".into(),
            r#enum: Some(vec!["read".into(), "write".into(), "append".into()]),
            items: None,
        },
        Parameter {
            name: "path".into(),
            param_type: ParameterType::String,
            required: true,
            description: "path relative to the tool's configured root".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "content".into(),
            param_type: ParameterType::String,
            required: false,
            description: "content to write or append; ignored for read".into(),
            r#enum: None,
            items: None,
        },
    ]
}

fn resolve_under_root(root: &Path, relative: &str) -> Result<PathBuf, CoreError> {
    let joined = root.join(relative);
    let normalized = path_clean(&joined);
    if !normalized.starts_with(root) {
        return Err(CoreError::ToolArgumentError(format!(
            "path '{relative}' escapes the configured root"
        )));
    }
    Ok(normalized)
}

/// Lexical `..`/`.` resolution without touching the filesystem (the target may not
/// exist yet, e.g. for a write).
fn path_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[async_trait]
impl ToolDyn for FileTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Read, write, or append a text file under a sandboxed root directory."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let root = resolved
            .get("root")
            .ok_or_else(|| CoreError::ConfigError("file tool requires a 'root' configuration key".into()))?;
        let root = PathBuf::from(root);

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let operation = arguments["operation"].as_str().unwrap_or_default();
        let relative = arguments["path"].as_str().unwrap_or_default();
        let target = resolve_under_root(&root, relative)?;

        match operation {
            "read" => tokio::fs::read_to_string(&target)
                .await
                .map_err(|e| CoreError::Internal(format!("read {relative}: {e}"))),
            "write" => {
                let content = arguments["content"].as_str().unwrap_or_default();
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await.ok();
                }
                tokio::fs::write(&target, content)
                    .await
                    .map_err(|e| CoreError::Internal(format!("write {relative}: {e}")))?;
                Ok(format!("wrote {} bytes to {relative}", content.len()))
            }
            "append" => {
                use tokio::io::AsyncWriteExt;
                let content = arguments["content"].as_str().unwrap_or_default();
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&target)
                    .await
                    .map_err(|e| CoreError::Internal(format!("append {relative}: {e}")))?;
                file.write_all(content.as_bytes())
                    .await
                    .map_err(|e| CoreError::Internal(format!("append {relative}: {e}")))?;
                Ok(format!("appended {} bytes to {relative}", content.len()))
            }
            other => Err(CoreError::ToolArgumentError(format!(
                "unknown operation '{other}'"
            ))),
        }
    }
}

/// Builds [`FileTool`] instances.
pub struct FileToolFactory;

impl ToolFactory for FileToolFactory {
    fn tool_type(&self) -> &str {
        "file"
    }

    fn config_keys(&self) -> &[&str] {
        &["root"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(FileTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
        })
    }
}
