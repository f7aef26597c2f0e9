#![deny(missing_docs)]
//! The Sub-Agent Tool, `AgentSession` bookkeeping, and the Session Janitor (spec §4.4).
//!
//! `chorus-subagent` depends on `chorus-orchestrator` for [`chorus_orchestrator::EntityDirectory`]
//! and [`chorus_orchestrator::subagent_port::OrchestratorHandle`], but the reverse never
//! holds — the Chat Orchestrator drives the Sub-Agent Tool only through that trait seam,
//! so the crate graph stays acyclic (spec §9 "Cyclic references avoided").

mod janitor;
mod session_store;
mod tool;

pub use janitor::SessionJanitor;
pub use session_store::{AgentSessionStore, InMemoryAgentSessionStore};
pub use tool::SubAgentTool;
