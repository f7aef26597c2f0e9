#![deny(missing_docs)]
//! Normalized [`Provider`] trait, request/response shapes, and API-key indirection
//! shared by every concrete provider adapter (spec §2 component 1, §4.2).
//!
//! `chorus-provider` has no concrete adapter of its own; see `chorus-provider-openai`,
//! `chorus-provider-anthropic`, and `chorus-provider-compat`.

mod error;
mod keyref;
mod provider;
mod types;

pub use error::ProviderError;
pub use keyref::resolve_api_key;
pub use provider::Provider;
pub use types::{
    build_tool_schema, compute_cost, GenerateOptions, GenerateRequest, GenerateResponse,
    GenerateUsage, RequestMessage, Role, ToolCallOut, ToolCallRef, ToolSchema,
};
