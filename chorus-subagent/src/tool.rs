//! The Sub-Agent Tool (spec §4.4): lets one agent delegate a bounded task to another
//! agent/model pair by recursively driving the Chat Orchestrator on a fresh, isolated
//! chat. Grounded on `agent-runtime::sub_agent::SubAgentManager::spawn` (depth guard,
//! tool-list filtering) and `chorus_tool_builtin::file::FileTool` (argument validation
//! inside `execute`, configuration-as-fields shape).

use crate::session_store::AgentSessionStore;
use async_trait::async_trait;
use chorus_core::{Agent, AgentSession, Chat, ConversationStore, CoreError, Parameter, ParameterType, SessionStatus};
use chorus_orchestrator::subagent_port::OrchestratorHandle;
use chorus_orchestrator::{read_orchestration_context, EntityDirectory, TurnContext};
use chorus_tool::{validate_arguments, ToolDyn};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_MINUTES: u64 = 30;
const DEFAULT_MAX_DEPTH: u32 = 4;

fn parameters() -> Vec<Parameter> {
    vec![
        Parameter {
            name: "agent_id".into(),
            param_type: ParameterType::String,
            required: true,
            description: "id of the agent to delegate the task to".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "task".into(),
            param_type: ParameterType::String,
            required: true,
            description: "the task to hand off to the sub-agent".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "context".into(),
            param_type: ParameterType::Object,
            required: false,
            description: "additional context serialized alongside the task".into(),
            r#enum: None,
            items: None,
        },
        Parameter {
            name: "tools".into(),
            param_type: ParameterType::Array,
            required: false,
            description: "override the sub-agent's tool allow-list for this call".into(),
            r#enum: None,
            items: Some(Box::new(Parameter {
                name: "tool".into(),
                param_type: ParameterType::String,
                required: false,
                description: String::new(),
                r#enum: None,
                items: None,
            })),
        },
        Parameter {
            name: "timeout".into(),
            param_type: ParameterType::Number,
            required: false,
            description: "timeout for the sub-agent's turn, in minutes (default 30)".into(),
            r#enum: None,
            items: None,
        },
    ]
}

/// Delegates a task to another agent/model pair by nesting a nested chat turn
/// (spec §4.4). Held by the Tool Registry like any other tool; reaches the Chat
/// Orchestrator through the injected [`OrchestratorHandle`] seam rather than a direct
/// dependency, keeping the crate graph acyclic (spec §9).
pub struct SubAgentTool {
    name: String,
    parameters: Vec<Parameter>,
    directory: Arc<dyn EntityDirectory>,
    store: Arc<dyn ConversationStore>,
    sessions: Arc<dyn AgentSessionStore>,
    orchestrator: Arc<dyn OrchestratorHandle>,
    max_depth: u32,
}

impl SubAgentTool {
    /// Build a Sub-Agent Tool, registered under `name` (conventionally `"sub_agent"`).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        directory: Arc<dyn EntityDirectory>,
        store: Arc<dyn ConversationStore>,
        sessions: Arc<dyn AgentSessionStore>,
        orchestrator: Arc<dyn OrchestratorHandle>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters: parameters(),
            directory,
            store,
            sessions,
            orchestrator,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the default maximum nesting depth (spec §4.4, default 4).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    async fn run(&self, arguments_json: &str) -> Result<String, CoreError> {
        validate_arguments(arguments_json, &self.parameters)?;
        let orchestration = read_orchestration_context(arguments_json).ok_or_else(|| {
            CoreError::Internal("sub_agent tool invoked outside the chat loop: no orchestration context".into())
        })?;

        if orchestration.depth + 1 > self.max_depth {
            return Err(CoreError::Validation(format!(
                "sub-agent nesting depth would exceed the configured maximum of {}",
                self.max_depth
            )));
        }

        let arguments: serde_json::Value = serde_json::from_str(arguments_json)
            .map_err(|e| CoreError::ToolArgumentError(e.to_string()))?;
        let sub_agent_id = arguments["agent_id"].as_str().unwrap_or_default().to_string();
        let task = arguments["task"].as_str().unwrap_or_default().to_string();
        let context = arguments.get("context").cloned();
        let tool_override: Option<Vec<String>> = arguments.get("tools").and_then(|v| v.as_array()).map(|values| {
            values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
        });
        let timeout_minutes = arguments.get("timeout").and_then(serde_json::Value::as_u64).unwrap_or(DEFAULT_TIMEOUT_MINUTES);

        let sub_agent = self
            .directory
            .get_agent(&sub_agent_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("sub-agent '{sub_agent_id}' not found")))?;

        let caller_chat = self
            .store
            .get_chat(&orchestration.chat_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("calling chat {}", orchestration.chat_id)))?;

        let model_id = context
            .as_ref()
            .and_then(|c| c.get("model_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(caller_chat.model_id);

        let bound_agent_id = self.bind_agent_for_call(sub_agent, tool_override).await?;

        let session_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now();
        let sub_chat = self
            .store
            .create_chat(&bound_agent_id, &model_id, &Chat::default_name(now))
            .await?;

        self.sessions
            .create(AgentSession {
                id: session_id.clone(),
                parent_agent_id: caller_chat.agent_id.clone(),
                sub_agent_id: sub_agent_id.clone(),
                task_id: sub_chat.id.clone(),
                status: SessionStatus::Active,
                created_at: now,
                completed_at: None,
                result: None,
            })
            .await?;

        let content = match &context {
            Some(value) => format!("{task}\n\nContext:\n{value}"),
            None => task,
        };

        let nested_ctx = TurnContext { depth: orchestration.depth, timeout: None }
            .nested(Duration::from_secs(timeout_minutes.saturating_mul(60)));

        match self.orchestrator.send_message(nested_ctx, &sub_chat.id, &content).await {
            Ok(message) => {
                self.sessions.mark_completed(&session_id, message.content.clone()).await?;
                Ok(message.content)
            }
            Err(err) => {
                self.sessions.mark_failed(&session_id, err.to_string()).await?;
                Err(err)
            }
        }
    }

    /// Bind the Agent the nested chat should use: the target agent as-is, unless a
    /// `tools` override was supplied, in which case a derived Agent with the filtered
    /// tool list is registered under a fresh id (spec §4.4 `tools` parameter).
    async fn bind_agent_for_call(&self, sub_agent: Agent, tool_override: Option<Vec<String>>) -> Result<String, CoreError> {
        let Some(tools) = tool_override else {
            return Ok(sub_agent.id);
        };
        let derived_id = format!("{}#{}", sub_agent.id, uuid::Uuid::new_v4());
        let derived = Agent {
            id: derived_id.clone(),
            name: sub_agent.name,
            system_prompt: sub_agent.system_prompt,
            tools,
        };
        self.directory.put_agent(derived).await?;
        Ok(derived_id)
    }
}

#[async_trait]
impl ToolDyn for SubAgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Delegate a bounded task to another agent/model pair and return its final answer."
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError> {
        self.run(arguments_json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_store::InMemoryAgentSessionStore;
    use chorus_orchestrator::InMemoryDirectory;
    use chorus_store_memory::MemoryStore;
    use tokio::sync::Mutex;

    struct EchoOrchestrator {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl EchoOrchestrator {
        fn new(fail: bool) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail }
        }
    }

    #[async_trait]
    impl OrchestratorHandle for EchoOrchestrator {
        async fn send_message(&self, _ctx: TurnContext, chat_id: &str, content: &str) -> Result<chorus_core::Message, CoreError> {
            self.calls.lock().await.push((chat_id.to_string(), content.to_string()));
            if self.fail {
                return Err(CoreError::Transient("sub-agent upstream unavailable".into()));
            }
            Ok(chorus_core::Message {
                id: "m1".into(),
                role: chorus_core::MessageRole::Assistant,
                content: format!("handled: {content}"),
                timestamp: chrono::Utc::now(),
                tool_call_id: None,
                tool_calls: None,
                token_usage: None,
            })
        }
    }

    fn sub_agent(tools: Vec<String>) -> Agent {
        Agent {
            id: "researcher".into(),
            name: "Researcher".into(),
            system_prompt: "research things".into(),
            tools,
        }
    }

    async fn build(fail: bool) -> (SubAgentTool, Arc<MemoryStore>, Arc<InMemoryAgentSessionStore>, String) {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.seed_agent(sub_agent(vec!["search".into()]));
        let store = Arc::new(MemoryStore::new());
        let caller_chat = store.create_chat("caller-agent", "model-1", "Caller").await.unwrap();
        let sessions = Arc::new(InMemoryAgentSessionStore::new());
        let orchestrator: Arc<dyn OrchestratorHandle> = Arc::new(EchoOrchestrator::new(fail));

        let tool = SubAgentTool::new("sub_agent", directory, store.clone(), sessions.clone(), orchestrator);
        (tool, store, sessions, caller_chat.id)
    }

    fn arguments(chat_id: &str, depth: u32, extra: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(extra).unwrap();
        value["__chorus_orchestration"] = serde_json::json!({ "chat_id": chat_id, "depth": depth });
        value.to_string()
    }

    #[tokio::test]
    async fn delegates_and_completes_the_session() {
        let (tool, _store, sessions, chat_id) = build(false).await;
        let args = arguments(&chat_id, 0, r#"{"agent_id": "researcher", "task": "find the answer"}"#);

        let result = tool.execute(&args).await.unwrap();
        assert_eq!(result, "handled: find the answer");

        let all_sessions = sessions.list().await.unwrap();
        assert_eq!(all_sessions.len(), 1);
        assert_eq!(all_sessions[0].status, chorus_core::SessionStatus::Completed);
        assert_eq!(all_sessions[0].result.as_deref(), Some("handled: find the answer"));
    }

    #[tokio::test]
    async fn failed_delegation_marks_the_session_failed() {
        let (tool, _store, sessions, chat_id) = build(true).await;
        let args = arguments(&chat_id, 0, r#"{"agent_id": "researcher", "task": "find the answer"}"#);

        let err = tool.execute(&args).await.unwrap_err();
        assert!(matches!(err, CoreError::Transient(_)));

        let all_sessions = sessions.list().await.unwrap();
        assert_eq!(all_sessions[0].status, chorus_core::SessionStatus::Failed);
    }

    #[tokio::test]
    async fn unknown_agent_is_rejected_before_any_session_is_created() {
        let (tool, _store, sessions, chat_id) = build(false).await;
        let args = arguments(&chat_id, 0, r#"{"agent_id": "ghost", "task": "find the answer"}"#);

        let err = tool.execute(&args).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(sessions.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn depth_beyond_max_is_rejected() {
        let (tool, _store, sessions, chat_id) = build(false).await;
        let args = arguments(&chat_id, DEFAULT_MAX_DEPTH, r#"{"agent_id": "researcher", "task": "go deeper"}"#);

        let err = tool.execute(&args).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(sessions.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_orchestration_context_is_an_internal_error() {
        let (tool, _store, _sessions, _chat_id) = build(false).await;
        let err = tool
            .execute(r#"{"agent_id": "researcher", "task": "find the answer"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }

    #[tokio::test]
    async fn tools_override_registers_a_derived_agent() {
        let (tool, directory_store, _sessions, chat_id) = build(false).await;
        let args = arguments(
            &chat_id,
            0,
            r#"{"agent_id": "researcher", "task": "find the answer", "tools": ["search"]}"#,
        );
        tool.execute(&args).await.unwrap();

        let chats = directory_store.list_active_chats().await.unwrap();
        assert_eq!(chats.len(), 2);
        let nested = chats.iter().find(|c| c.id != chat_id).unwrap();
        assert!(nested.agent_id.starts_with("researcher#"));
    }
}
