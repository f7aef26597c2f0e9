#![deny(missing_docs)]
//! Tool registry, factory registration, `#{ENV_NAME}#` configuration resolution, and
//! argument validation for chorus tools (spec §4.3).

mod registry;
mod resolve;
mod validate;

pub use registry::{ToolDyn, ToolFactory, ToolFactoryRegistry, ToolRegistry};
pub use resolve::resolve_configuration;
pub use validate::validate_arguments;
