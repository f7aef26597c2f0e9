//! Directory-listing tool (spec §4.3 "a directory tool").

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use std::path::PathBuf;
use std::sync::Arc;

/// Lists entries of a directory under `configuration["root"]`.
pub struct DirectoryTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
}

fn parameters() -> Vec<Parameter> {
    vec![Parameter {
        name: "path".into(),
        param_type: ParameterType::String,
        required: false,
        description: "directory to list, relative to the configured root; defaults to the root itself".into(),
        r#enum: None,
        items: None,
    }]
}

#[async_trait]
impl ToolDyn for DirectoryTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "List the entries of a directory under a sandboxed root."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let root = resolved
            .get("root")
            .ok_or_else(|| CoreError::ConfigError("directory tool requires a 'root' configuration key".into()))?;
        let root = PathBuf::from(root);

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let relative = arguments["path"].as_str().unwrap_or("");
        let target = path_clean(&root.join(relative));
        if !target.starts_with(&root) {
            return Err(CoreError::ToolArgumentError(format!(
                "path '{relative}' escapes the configured root"
            )));
        }

        let mut read_dir = tokio::fs::read_dir(&target)
            .await
            .map_err(|e| CoreError::Internal(format!("list {relative}: {e}")))?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| CoreError::Internal(format!("list {relative}: {e}")))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let suffix = if is_dir { "/" } else { "" };
            entries.push(format!("{}{suffix}", entry.file_name().to_string_lossy()));
        }
        entries.sort();
        Ok(entries.join("\n"))
    }
}

/// Lexical `..`/`.` resolution without touching the filesystem.
fn path_clean(path: &std::path::Path) -> PathBuf {
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

/// Builds [`DirectoryTool`] instances.
pub struct DirectoryToolFactory;

impl ToolFactory for DirectoryToolFactory {
    fn tool_type(&self) -> &str {
        "directory"
    }

    fn config_keys(&self) -> &[&str] {
        &["root"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(DirectoryTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn lists_files_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), "x").await.unwrap();
        tokio::fs::create_dir(dir.path().join("sub")).await.unwrap();

        let mut configuration = HashMap::new();
        configuration.insert("root".to_string(), dir.path().display().to_string());
        let tool = DirectoryTool {
            name: "directory".into(),
            configuration,
            parameters: parameters(),
        };

        let listing = tool.execute("{}").await.unwrap();
        assert!(listing.contains("a.txt"));
        assert!(listing.contains("sub/"));
    }

    #[tokio::test]
    async fn rejects_path_escaping_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut configuration = HashMap::new();
        configuration.insert("root".to_string(), dir.path().display().to_string());
        let tool = DirectoryTool {
            name: "directory".into(),
            configuration,
            parameters: parameters(),
        };
        let err = tool
            .execute(r#"{"path": "../"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ToolArgumentError(_)));
    }
}
