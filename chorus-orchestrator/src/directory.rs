//! Single-entity lookup for Agents, Models, and Providers (spec §4.1 step 1).
//!
//! `chorus-core::ConversationStore` only contracts Chat persistence (spec §4.5);
//! `chorus_catalog::ProviderModelStore` contracts the Refresher's list/upsert/delete
//! surface over Providers and Models. Neither gives the Orchestrator what step 1 of
//! `sendMessage` needs: "load chat, agent, model, provider" by id. This trait is that
//! narrower by-id lookup, shaped like `ConversationStore` (spec §4.5).

use async_trait::async_trait;
use chorus_core::{Agent, CoreError, Model, Provider};

/// Resolves the Agent/Model/Provider a Chat is bound to (spec §4.1 step 1).
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Fetch an Agent by id.
    async fn get_agent(&self, id: &str) -> Result<Option<Agent>, CoreError>;

    /// Fetch a Model by id.
    async fn get_model(&self, id: &str) -> Result<Option<Model>, CoreError>;

    /// Fetch a Provider by id.
    async fn get_provider(&self, id: &str) -> Result<Option<Provider>, CoreError>;

    /// Register (or overwrite) an Agent. The Sub-Agent Tool uses this to bind a
    /// derived, tool-filtered Agent to a fresh nested chat (spec §4.4 `tools`
    /// override parameter) without mutating the caller's own Agent entity.
    async fn put_agent(&self, agent: Agent) -> Result<(), CoreError>;
}

fn _assert_object_safe(_: &dyn EntityDirectory) {}

/// An in-memory [`EntityDirectory`], for tests and small single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    agents: std::sync::Mutex<std::collections::HashMap<String, Agent>>,
    models: std::sync::Mutex<std::collections::HashMap<String, Model>>,
    providers: std::sync::Mutex<std::collections::HashMap<String, Provider>>,
}

impl InMemoryDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an Agent, for test setup.
    pub fn seed_agent(&self, agent: Agent) {
        self.agents.lock().expect("lock poisoned").insert(agent.id.clone(), agent);
    }

    /// Seed a Model, for test setup.
    pub fn seed_model(&self, model: Model) {
        self.models.lock().expect("lock poisoned").insert(model.id.clone(), model);
    }

    /// Seed a Provider, for test setup.
    pub fn seed_provider(&self, provider: Provider) {
        self.providers.lock().expect("lock poisoned").insert(provider.id.clone(), provider);
    }
}

#[async_trait]
impl EntityDirectory for InMemoryDirectory {
    async fn get_agent(&self, id: &str) -> Result<Option<Agent>, CoreError> {
        Ok(self.agents.lock().expect("lock poisoned").get(id).cloned())
    }

    async fn get_model(&self, id: &str) -> Result<Option<Model>, CoreError> {
        Ok(self.models.lock().expect("lock poisoned").get(id).cloned())
    }

    async fn get_provider(&self, id: &str) -> Result<Option<Provider>, CoreError> {
        Ok(self.providers.lock().expect("lock poisoned").get(id).cloned())
    }

    async fn put_agent(&self, agent: Agent) -> Result<(), CoreError> {
        self.seed_agent(agent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::ProviderType;

    #[tokio::test]
    async fn seeded_entities_round_trip() {
        let directory = InMemoryDirectory::new();
        directory.seed_agent(Agent {
            id: "a1".into(),
            name: "Agent".into(),
            system_prompt: "be helpful".into(),
            tools: vec![],
        });
        directory.seed_provider(Provider {
            id: "p1".into(),
            provider_type: ProviderType::OpenAi,
            display_name: "OpenAI".into(),
            base_url: "https://api.openai.com".into(),
            api_key_ref: "#{OPENAI_API_KEY}#".into(),
            model_pricing: vec![],
        });

        assert!(directory.get_agent("a1").await.unwrap().is_some());
        assert!(directory.get_provider("p1").await.unwrap().is_some());
        assert!(directory.get_model("missing").await.unwrap().is_none());
    }
}
