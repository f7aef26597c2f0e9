//! Shell-execution tool (spec §4.3 "a shell-execution tool"). Grounded on
//! `sven-tools::builtin::shell::ShellTool` (reference pack, `swedishembedded-sven`):
//! bounded timeout, `kill_on_drop`, and head/tail truncation of oversized output.

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter, ParameterType, Tool};
use chorus_tool::{resolve_configuration, validate_arguments, ToolDyn, ToolFactory};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Output is capped at this many bytes; oversized output keeps the head and tail
/// and drops the middle, since errors and summaries usually live at the edges.
const OUTPUT_LIMIT_BYTES: usize = 20_000;
const HEAD_LINES: usize = 100;
const TAIL_LINES: usize = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs a command with `bash -c` and returns combined stdout/stderr.
pub struct ShellTool {
    name: String,
    configuration: std::collections::HashMap<String, String>,
    parameters: Vec<Parameter>,
}

fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            name: "command".into(),
            param_type: ParameterType::String,
            required: true,
            description: "the shell command to execute".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "workdir".into(),
            param_type: ParameterType::String,
            required: false,
            description: "working directory, defaults to the process cwd".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "timeout_secs".into(),
            param_type: ParameterType::Integer,
            required: false,
            description: "execution timeout in seconds".into(),
            r#enum: None,
            items: None,
        },
    ]
}

#[async_trait]
impl ToolDyn for ShellTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its stdout and stderr, truncated if large."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, self.parameters())?;
        let resolved = resolve_configuration(&self.configuration)?;
        let default_timeout = resolved
            .get("timeout_secs")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let command = arguments["command"].as_str().unwrap_or_default();
        let workdir = arguments["workdir"].as_str();
        let timeout_secs = arguments["timeout_secs"].as_u64().unwrap_or(default_timeout);

        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(command);
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);
        if let Some(dir) = workdir {
            cmd.current_dir(dir);
        }

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(timeout_secs),
            cmd.output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                let mut content = String::new();
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stdout.is_empty() {
                    content.push_str(&head_tail_truncate(&stdout));
                }
                if !stderr.is_empty() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str("[stderr]\n");
                    content.push_str(&head_tail_truncate(&stderr));
                }
                let code = output.status.code().unwrap_or(-1);
                if content.is_empty() {
                    content = format!("[exit {code}]");
                }
                if code == 0 {
                    Ok(content)
                } else {
                    Err(CoreError::Internal(format!("[exit {code}]\n{content}")))
                }
            }
            Ok(Err(e)) => Err(CoreError::Internal(format!("spawn error: {e}"))),
            Err(_) => Err(CoreError::Internal(format!("timeout after {timeout_secs}s"))),
        }
    }
}

fn head_tail_truncate(s: &str) -> String {
    if s.len() <= OUTPUT_LIMIT_BYTES {
        return s.to_string();
    }
    let lines: Vec<&str> = s.lines().collect();
    let total = lines.len();
    if total <= HEAD_LINES + TAIL_LINES {
        let head_end = (OUTPUT_LIMIT_BYTES / 2).min(s.len());
        let tail_start = s.len().saturating_sub(OUTPUT_LIMIT_BYTES / 2);
        return format!(
            "{}\n...[truncated]...\n{}",
            &s[..head_end],
            &s[tail_start..]
        );
    }
    let head = lines[..HEAD_LINES].join("\n");
    let tail = lines[total - TAIL_LINES..].join("\n");
    let omitted = total - HEAD_LINES - TAIL_LINES;
    format!("{head}\n...[{omitted} lines omitted]...\n{tail}")
}

/// Builds [`ShellTool`] instances.
pub struct ShellToolFactory;

impl ToolFactory for ShellToolFactory {
    fn tool_type(&self) -> &str {
        "shell"
    }

    fn config_keys(&self) -> &[&str] {
        &["timeout_secs"]
    }

    fn build(&self, tool: &Tool) -> Arc<dyn ToolDyn> {
        Arc::new(ShellTool {
            name: tool.name.clone(),
            configuration: tool.configuration.clone(),
            parameters: parameters(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ShellTool {
        ShellTool {
            name: "shell".into(),
            configuration: Default::default(),
            parameters: parameters(),
        }
    }

    #[tokio::test]
    async fn executes_and_returns_stdout() {
        let out = tool()
            .execute(r#"{"command": "echo hello"}"#)
            .await
            .unwrap();
        assert!(out.contains("hello"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_an_error() {
        let err = tool().execute(r#"{"command": "exit 3"}"#).await.unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }

    #[tokio::test]
    async fn timeout_is_enforced() {
        let err = tool()
            .execute(r#"{"command": "sleep 5", "timeout_secs": 1}"#)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("timeout"));
    }

    #[tokio::test]
    async fn workdir_changes_cwd() {
        let out = tool()
            .execute(r#"{"command": "pwd", "workdir": "/tmp"}"#)
            .await
            .unwrap();
        assert!(out.trim().contains("tmp"));
    }

    #[test]
    fn truncates_long_output_with_head_and_tail() {
        let line = "x".repeat(29);
        let content: String = (0..1000).map(|i| format!("line{i}: {line}\n")).collect();
        let result = head_tail_truncate(&content);
        assert!(result.len() < content.len());
        assert!(result.contains("omitted"));
    }
}
