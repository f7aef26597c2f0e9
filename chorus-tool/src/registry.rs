//! Object-safe tool execution and lookup (spec §4.3).
//!
//! [`ToolDyn`] is deliberately object-safe (`async-trait`-backed, like
//! `chorus_provider::Provider`) so the orchestrator can dispatch to whichever concrete
//! tool a chat's [`chorus_core::Agent`] names at runtime, without a generic parameter
//! threaded through every layer above it.

use async_trait::async_trait;
use chorus_core::{CoreError, Parameter};
use std::collections::HashMap;
use std::sync::Arc;

/// A constructed, runnable tool instance.
///
/// Implementations are value objects: once built by a [`ToolFactory`], a `ToolDyn`
/// never mutates its own configuration (spec §9, "tool instances never mutate after
/// construction"). `execute` receives the raw tool-call arguments JSON and is
/// responsible for validating it against [`ToolDyn::parameters`] before acting.
#[async_trait]
pub trait ToolDyn: Send + Sync {
    /// Unique tool name, matching the owning [`chorus_core::Tool::name`].
    fn name(&self) -> &str;

    /// Human-readable description surfaced to the model.
    fn description(&self) -> &str;

    /// Declared parameter schema, used for both provider-facing schema export
    /// (`chorus_provider::build_tool_schema`) and argument validation.
    fn parameters(&self) -> &[Parameter];

    /// Execute the tool against raw arguments JSON, returning the tool-result text
    /// that becomes a `tool` role message (spec §4.1 step 4). Implementations should
    /// call [`crate::validate_arguments`] before touching their own configuration.
    async fn execute(&self, arguments_json: &str) -> Result<String, CoreError>;
}

/// A lookup table of constructed tools, keyed by name.
///
/// Built once per [`chorus_core::Agent`] resolution (spec §4.1 step 1: "the agent's
/// referenced tools are not all resolvable" is a validation failure at that point, not
/// at call time).
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
}

impl ToolRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructed tool, keyed by its own `name()`.
    pub fn register(&mut self, tool: Arc<dyn ToolDyn>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDyn>> {
        self.tools.get(name).cloned()
    }

    /// Resolve an agent's `tools` allow-list into concrete instances, failing the
    /// whole resolution if any name is unregistered (spec §4.1 step 1).
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Arc<dyn ToolDyn>>, CoreError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| CoreError::NotFound(format!("tool '{name}' is not registered")))
            })
            .collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builds a [`ToolDyn`] from a [`chorus_core::Tool`] value object (spec §4.3: "a
/// mapping from tool name to tool factory").
///
/// Factories are registered by `tool_type` (e.g. `"file_read"`, `"shell_exec"`) — a
/// stable name distinct from the per-agent `Tool.name`, since two agents may each
/// declare their own `Tool` of the same type with different `configuration`.
pub trait ToolFactory: Send + Sync {
    /// The factory's stable type name, matched against a deployment's tool catalog.
    fn tool_type(&self) -> &str;

    /// Configuration keys this factory's tools read from `Tool.configuration`,
    /// surfaced for deployment-time validation.
    fn config_keys(&self) -> &[&str];

    /// Build a runnable tool instance from a configured [`chorus_core::Tool`].
    fn build(&self, tool: &chorus_core::Tool) -> Arc<dyn ToolDyn>;
}

/// A lookup table of tool factories, keyed by `tool_type`.
#[derive(Default)]
pub struct ToolFactoryRegistry {
    factories: HashMap<String, Arc<dyn ToolFactory>>,
}

impl ToolFactoryRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, keyed by its own `tool_type()`.
    pub fn register(&mut self, factory: Arc<dyn ToolFactory>) {
        self.factories.insert(factory.tool_type().to_string(), factory);
    }

    /// Build a [`ToolDyn`] from a configured [`chorus_core::Tool`], looking up the
    /// factory by `tool_type`.
    pub fn build(&self, tool_type: &str, tool: &chorus_core::Tool) -> Result<Arc<dyn ToolDyn>, CoreError> {
        self.factories
            .get(tool_type)
            .map(|factory| factory.build(tool))
            .ok_or_else(|| CoreError::NotFound(format!("tool factory '{tool_type}' is not registered")))
    }
}
