#![deny(missing_docs)]
//! The Chat Orchestrator (spec §2 component 6, §4.1): the chat loop, per-chat
//! cancellation, history pruning, and the Title Generator (§4.7).
//!
//! `chorus-orchestrator` selects a concrete [`chorus_provider::Provider`] adapter at
//! runtime (spec §4.2 "polymorphic client keyed by providerType") and never depends
//! on `chorus-subagent` — the Sub-Agent Tool reaches back in through
//! [`subagent_port::OrchestratorHandle`] instead, keeping the dependency graph
//! acyclic (spec §9 "Cyclic references avoided").

mod cancellation;
mod directory;
mod orchestrator;
mod provider_factory;
mod pruning;
pub mod subagent_port;
mod title;
mod tool_context;

pub use cancellation::CancellationTable;
pub use directory::{EntityDirectory, InMemoryDirectory};
pub use orchestrator::{ChatOrchestrator, OrchestratorConfig, TurnContext};
pub use provider_factory::{build_provider, DefaultProviderFactory, ProviderFactory};
pub use pruning::prune_history;
pub use title::TitleGenerator;
pub use tool_context::{read_orchestration_context, OrchestrationContext};
