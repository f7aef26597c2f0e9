//! The Chat Orchestrator (spec §2 component 6, §4.1) — the heart of the core.

use crate::cancellation::CancellationTable;
use crate::directory::EntityDirectory;
#[cfg(test)]
use crate::directory::InMemoryDirectory;
use crate::provider_factory::ProviderFactory;
use crate::pruning::prune_history;
use crate::title::TitleGenerator;
use crate::tool_context::with_orchestration_context;
use async_trait::async_trait;
use chorus_core::{
    Chat, Agent, ConversationStore, CoreError, Message, MessageRole, Model, Provider as ProviderEntity,
    TokenAccounting, ToolCallRequest, Usage,
};
use chorus_hooks::{HookAction, HookContext, HookPoint, HookRegistry};
use chorus_provider::{
    compute_cost, GenerateOptions, GenerateRequest, GenerateUsage, Provider, RequestMessage, Role,
    ToolCallOut, ToolSchema,
};
use chorus_tool::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS_RATIO: f64 = 0.25;
const DEFAULT_MAX_ITERATIONS: u32 = 16;
const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Static tuning knobs for the Orchestrator (spec §4.1 step 5, §5 "Timeouts").
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Maximum loop iterations before `LoopLimit` (spec §4.1 step 5; default 16).
    pub max_iterations: u32,
    /// Default per-turn timeout, layered on top of the caller's context (spec §5;
    /// default 5 minutes). A sub-agent's own `timeout` parameter overrides this for
    /// nested turns (spec §4.4).
    pub default_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            default_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }
}

/// Per-turn context threaded through `send_message` (spec §4.1, §4.4 "depth counter
/// threaded through the orchestration context").
#[derive(Debug, Clone, Copy)]
pub struct TurnContext {
    /// Sub-agent recursion depth; 0 for a top-level user turn (spec §4.4).
    pub depth: u32,
    /// Overrides [`OrchestratorConfig::default_timeout`] for this turn, if set.
    pub timeout: Option<Duration>,
}

impl TurnContext {
    /// A top-level turn context: depth 0, default timeout.
    #[must_use]
    pub fn root() -> Self {
        Self { depth: 0, timeout: None }
    }

    /// A context for a nested sub-agent turn, one level deeper than `self`, with its
    /// own timeout (spec §4.4 `timeout` parameter).
    #[must_use]
    pub fn nested(&self, timeout: Duration) -> Self {
        Self { depth: self.depth + 1, timeout: Some(timeout) }
    }
}

/// Runs one logical user turn to completion: `sendMessage(ctx, chatId, message)`
/// (spec §4.1).
pub struct ChatOrchestrator {
    store: Arc<dyn ConversationStore>,
    directory: Arc<dyn EntityDirectory>,
    tools: Arc<ToolRegistry>,
    hooks: HookRegistry,
    cancellation: CancellationTable,
    config: OrchestratorConfig,
    provider_factory: Arc<dyn ProviderFactory>,
}

impl ChatOrchestrator {
    /// Build an Orchestrator over the given Conversation Store, Entity Directory, and
    /// Tool Registry, using [`crate::DefaultProviderFactory`] to select adapters.
    #[must_use]
    pub fn new(
        store: Arc<dyn ConversationStore>,
        directory: Arc<dyn EntityDirectory>,
        tools: Arc<ToolRegistry>,
        hooks: HookRegistry,
        config: OrchestratorConfig,
    ) -> Self {
        Self::with_provider_factory(
            store,
            directory,
            tools,
            hooks,
            config,
            Arc::new(crate::provider_factory::DefaultProviderFactory),
        )
    }

    /// Build an Orchestrator with an explicit [`ProviderFactory`] (tests inject a
    /// canned adapter here instead of standing up real HTTP credentials).
    #[must_use]
    pub fn with_provider_factory(
        store: Arc<dyn ConversationStore>,
        directory: Arc<dyn EntityDirectory>,
        tools: Arc<ToolRegistry>,
        hooks: HookRegistry,
        config: OrchestratorConfig,
        provider_factory: Arc<dyn ProviderFactory>,
    ) -> Self {
        Self {
            store,
            directory,
            tools,
            hooks,
            cancellation: CancellationTable::new(),
            config,
            provider_factory,
        }
    }

    /// Signal cancellation for an in-flight turn on `chat_id` (spec §4.1, §5).
    /// Returns `true` if a turn was actually in flight.
    pub async fn cancel(&self, chat_id: &str) -> bool {
        self.cancellation.cancel(chat_id).await
    }

    /// Run one turn: append `content` as a user message, loop against the Provider
    /// Client and Tool Invoker, and return the final assistant message (spec §4.1).
    pub async fn send_message(
        &self,
        ctx: TurnContext,
        chat_id: &str,
        content: &str,
    ) -> Result<Message, CoreError> {
        if content.trim().is_empty() {
            return Err(CoreError::Validation("message content must not be empty".into()));
        }

        let token = self.cancellation.register(chat_id).await;
        let result = self.run_turn(ctx, chat_id, content, token.clone()).await;
        self.cancellation.unregister(chat_id).await;
        result
    }

    async fn run_turn(
        &self,
        ctx: TurnContext,
        chat_id: &str,
        content: &str,
        token: CancellationToken,
    ) -> Result<Message, CoreError> {
        let timeout = ctx.timeout.unwrap_or(self.config.default_timeout);
        tokio::time::timeout(timeout, self.run_turn_inner(ctx.depth, chat_id, content, token))
            .await
            .map_err(|_| CoreError::Canceled)?
    }

    async fn run_turn_inner(
        &self,
        depth: u32,
        chat_id: &str,
        content: &str,
        token: CancellationToken,
    ) -> Result<Message, CoreError> {
        let span = tracing::info_span!("chat_turn", chat_id = %chat_id);
        let _entered = span.enter();

        let (chat, agent, model, provider_entity) = self.load_context(chat_id).await?;
        let resolved_tools = self.tools.resolve(&agent.tools).map_err(|e| {
            CoreError::Validation(format!("agent '{}' references an unresolvable tool: {e}", agent.id))
        })?;
        let provider = self.provider_factory.build(&provider_entity)?;

        let pricing = provider_entity.pricing_for(&model.model_name).ok_or_else(|| {
            CoreError::Internal(format!(
                "model '{}' is not priced on provider '{}'",
                model.model_name, provider_entity.id
            ))
        })?;
        let context_window = model.context_window.unwrap_or(pricing.context_window);

        let was_fresh_chat = !chat.has_completed_exchange();
        let user_message = Message::user(content);
        self.store
            .append_messages(chat_id, vec![user_message.clone()])
            .await?;

        let tool_schemas: Vec<ToolSchema> = resolved_tools
            .iter()
            .map(|tool| chorus_provider::build_tool_schema(tool.name(), tool.description(), tool.parameters()))
            .collect();

        let options = GenerateOptions {
            temperature: model.temperature.or(Some(DEFAULT_TEMPERATURE)),
            max_tokens: model
                .max_tokens
                .or(Some((context_window as f64 * DEFAULT_MAX_TOKENS_RATIO) as u64)),
            reasoning_effort: model.reasoning_effort.clone(),
        };

        let mut history = chat.messages;
        history.push(user_message);

        let mut cumulative_tokens: u64 = 0;
        let mut iterations: u32 = 0;
        let mut final_assistant: Option<Message> = None;

        loop {
            if token.is_cancelled() {
                return Err(CoreError::Canceled);
            }
            self.dispatch_hook(chat_id, HookPoint::ExitCheck, None, None, None, cumulative_tokens, iterations)
                .await?;
            if iterations >= self.config.max_iterations {
                return Err(CoreError::LoopLimit(format!(
                    "exceeded {} loop iterations",
                    self.config.max_iterations
                )));
            }
            if cumulative_tokens > context_window {
                return Err(CoreError::LoopLimit(format!(
                    "cumulative tokens {cumulative_tokens} exceeded context window {context_window}"
                )));
            }
            iterations += 1;

            self.dispatch_hook(chat_id, HookPoint::PreInference, None, None, None, cumulative_tokens, iterations)
                .await?;

            let pruned = prune_history(history.clone(), context_window);
            let request = GenerateRequest {
                model: model.model_name.clone(),
                system_prompt: agent.system_prompt.clone(),
                messages: pruned.iter().map(to_request_message).collect(),
                tools: tool_schemas.clone(),
                options: options.clone(),
            };

            let response = tokio::select! {
                response = provider.generate(request) => response.map_err(CoreError::from)?,
                () = token.cancelled() => return Err(CoreError::Canceled),
            };

            cumulative_tokens += response.usage.prompt + response.usage.completion;
            let cost = compute_cost(
                response.usage,
                pricing.input_price_per_mille,
                pricing.output_price_per_mille,
            );

            self.dispatch_hook(
                chat_id,
                HookPoint::PostInference,
                None,
                None,
                Some(response.assistant_text.clone()),
                cumulative_tokens,
                iterations,
            )
            .await?;

            let assistant_message = build_assistant_message(&response.assistant_text, &response.tool_calls, response.usage, cost);
            self.store
                .append_messages(chat_id, vec![assistant_message.clone()])
                .await?;
            history.push(assistant_message.clone());
            self.update_usage(chat_id, &history).await?;

            if response.tool_calls.is_empty() {
                final_assistant = Some(assistant_message);
                break;
            }

            for call in &response.tool_calls {
                if token.is_cancelled() {
                    return Err(CoreError::Canceled);
                }
                let tool_message = self
                    .dispatch_tool_call(chat_id, depth, call, cumulative_tokens, cost, iterations)
                    .await;
                self.store
                    .append_messages(chat_id, vec![tool_message.clone()])
                    .await?;
                history.push(tool_message);
            }
        }

        let final_message = final_assistant.expect("loop only exits with a final assistant message");

        if was_fresh_chat {
            self.maybe_generate_title(chat_id, &provider, &model.model_name, &history).await;
        }

        Ok(final_message)
    }

    async fn load_context(
        &self,
        chat_id: &str,
    ) -> Result<(Chat, Agent, Model, ProviderEntity), CoreError> {
        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("chat {chat_id}")))?;
        let agent = self
            .directory
            .get_agent(&chat.agent_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("agent {}", chat.agent_id)))?;
        let model = self
            .directory
            .get_model(&chat.model_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("model {}", chat.model_id)))?;
        let provider_entity = self
            .directory
            .get_provider(&model.provider_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("provider {}", model.provider_id)))?;
        Ok((chat, agent, model, provider_entity))
    }

    async fn dispatch_tool_call(
        &self,
        chat_id: &str,
        depth: u32,
        call: &ToolCallOut,
        tokens_used: u64,
        cost: rust_decimal::Decimal,
        iterations: u32,
    ) -> Message {
        let mut ctx = HookContext::new(HookPoint::PreToolUse, chat_id);
        ctx.tool_name = Some(call.name.clone());
        ctx.tool_arguments_json = Some(call.arguments_json.clone());
        ctx.tokens_used = tokens_used;
        ctx.cost = cost;
        ctx.iterations_completed = iterations;

        let mut arguments_json = with_orchestration_context(&call.arguments_json, chat_id, depth);
        match self.hooks.dispatch(&ctx).await {
            HookAction::Halt { reason } => {
                return tool_message(&call.id, format!("error: halted by hook: {reason}"));
            }
            HookAction::SkipTool { reason } => {
                return tool_message(&call.id, format!("skipped by policy: {reason}"));
            }
            HookAction::ModifyToolArguments { new_arguments_json } => {
                arguments_json = with_orchestration_context(&new_arguments_json, chat_id, depth);
            }
            HookAction::ModifyToolOutput { .. } | HookAction::Continue => {}
        }

        let result = match self.tools.get(&call.name) {
            None => Err(CoreError::NotFound(format!("tool '{}' not available", call.name))),
            Some(tool) => tool.execute(&arguments_json).await,
        };

        let mut content = match result {
            Ok(text) => text,
            Err(err) if err.is_tool_level() => format!("error: {err}"),
            Err(CoreError::NotFound(msg)) => format!("error: {msg}"),
            Err(err) => format!("error: {err}"),
        };

        let mut post_ctx = HookContext::new(HookPoint::PostToolUse, chat_id);
        post_ctx.tool_name = Some(call.name.clone());
        post_ctx.tool_result = Some(content.clone());
        post_ctx.tokens_used = tokens_used;
        post_ctx.cost = cost;
        post_ctx.iterations_completed = iterations;
        if let HookAction::ModifyToolOutput { new_output } = self.hooks.dispatch(&post_ctx).await {
            content = new_output;
        }

        tool_message(&call.id, content)
    }

    async fn dispatch_hook(
        &self,
        chat_id: &str,
        point: HookPoint,
        tool_name: Option<String>,
        tool_arguments_json: Option<String>,
        assistant_text: Option<String>,
        tokens_used: u64,
        iterations: u32,
    ) -> Result<(), CoreError> {
        if self.hooks.is_empty() {
            return Ok(());
        }
        let mut ctx = HookContext::new(point, chat_id);
        ctx.tool_name = tool_name;
        ctx.tool_arguments_json = tool_arguments_json;
        ctx.assistant_text = assistant_text;
        ctx.tokens_used = tokens_used;
        ctx.iterations_completed = iterations;
        match self.hooks.dispatch(&ctx).await {
            HookAction::Halt { reason } => Err(CoreError::Internal(format!("halted by hook: {reason}"))),
            _ => Ok(()),
        }
    }

    async fn update_usage(&self, chat_id: &str, history: &[Message]) -> Result<(), CoreError> {
        let usage = Usage::recompute(history);
        self.store.update_usage(chat_id, usage).await
    }

    async fn maybe_generate_title(
        &self,
        chat_id: &str,
        provider: &Arc<dyn Provider>,
        model_name: &str,
        history: &[Message],
    ) {
        let Some(user_message) = history.iter().find(|m| m.role == MessageRole::User) else {
            return;
        };
        let Some(assistant_message) = history
            .iter()
            .find(|m| m.role == MessageRole::Assistant && m.tool_calls.is_none())
        else {
            return;
        };
        if let Some(title) = TitleGenerator::generate(provider, model_name, user_message, assistant_message).await {
            if let Ok(Some(chat)) = self.store.get_chat(chat_id).await {
                if let Err(err) = self.store.update_chat(chat_id, &chat.agent_id, &chat.model_id, &title).await {
                    tracing::warn!(chat_id = %chat_id, error = %err, "failed to persist generated title");
                }
            }
        } else {
            tracing::warn!(chat_id = %chat_id, "title generation failed, chat keeps its default name");
        }
    }
}

fn to_request_message(message: &Message) -> RequestMessage {
    RequestMessage {
        role: to_request_role(message.role),
        content: message.content.clone(),
        tool_call_id: message.tool_call_id.clone(),
        tool_calls: message.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|c| ToolCallOut {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    arguments_json: c.arguments_json.clone(),
                })
                .collect()
        }),
    }
}

fn to_request_role(role: MessageRole) -> Role {
    match role {
        MessageRole::System => Role::System,
        MessageRole::User => Role::User,
        MessageRole::Assistant => Role::Assistant,
        MessageRole::Tool => Role::Tool,
    }
}

fn build_assistant_message(
    text: &str,
    tool_calls: &[ToolCallOut],
    usage: GenerateUsage,
    cost: rust_decimal::Decimal,
) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        role: MessageRole::Assistant,
        content: text.to_string(),
        timestamp: chrono::Utc::now(),
        tool_call_id: None,
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(
                tool_calls
                    .iter()
                    .map(|c| ToolCallRequest {
                        id: c.id.clone(),
                        name: c.name.clone(),
                        arguments_json: c.arguments_json.clone(),
                    })
                    .collect(),
            )
        },
        token_usage: Some(TokenAccounting {
            prompt: usage.prompt,
            completion: usage.completion,
            total: usage.prompt + usage.completion,
            cost,
        }),
    }
}

fn tool_message(tool_call_id: &str, content: String) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        role: MessageRole::Tool,
        content,
        timestamp: chrono::Utc::now(),
        tool_call_id: Some(tool_call_id.to_string()),
        tool_calls: None,
        token_usage: None,
    }
}

#[async_trait]
impl crate::subagent_port::OrchestratorHandle for ChatOrchestrator {
    async fn send_message(&self, ctx: TurnContext, chat_id: &str, content: &str) -> Result<Message, CoreError> {
        ChatOrchestrator::send_message(self, ctx, chat_id, content).await
    }
}
