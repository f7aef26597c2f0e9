#![deny(missing_docs)]
//! Built-in chorus tools (spec §4.3): filesystem, shell, directory, HTTP fetch, web
//! search, image generation, and vision. The Sub-Agent tool lives in `chorus-subagent`
//! since it needs a handle back into the orchestrator.

mod directory;
mod file;
mod http_fetch;
mod image_generation;
mod shell;
mod vision;
mod web_search;

pub use directory::{DirectoryTool, DirectoryToolFactory};
pub use file::{FileTool, FileToolFactory};
pub use http_fetch::{HttpFetchTool, HttpFetchToolFactory};
pub use image_generation::{ImageGenerationTool, ImageGenerationToolFactory};
pub use shell::{ShellTool, ShellToolFactory};
pub use vision::{VisionTool, VisionToolFactory};
pub use web_search::{WebSearchTool, WebSearchToolFactory};

use chorus_tool::ToolFactoryRegistry;
use std::sync::Arc;

/// Register all built-in tool factories (everything but the Sub-Agent tool) into a
/// [`ToolFactoryRegistry`].
pub fn register_builtin_factories(registry: &mut ToolFactoryRegistry) {
    registry.register(Arc::new(FileToolFactory));
    registry.register(Arc::new(ShellToolFactory));
    registry.register(Arc::new(DirectoryToolFactory));
    registry.register(Arc::new(HttpFetchToolFactory));
    registry.register(Arc::new(WebSearchToolFactory));
    registry.register(Arc::new(ImageGenerationToolFactory));
    registry.register(Arc::new(VisionToolFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::Tool;
    use std::collections::HashMap;

    #[test]
    fn registers_all_seven_builtin_factories() {
        let mut registry = ToolFactoryRegistry::new();
        register_builtin_factories(&mut registry);
        for tool_type in [
            "file",
            "shell",
            "directory",
            "http_fetch",
            "web_search",
            "image_generation",
            "vision",
        ] {
            let tool = Tool {
                name: format!("my_{tool_type}"),
                description: String::new(),
                parameters: vec![],
                configuration: HashMap::new(),
            };
            let built = registry.build(tool_type, &tool).unwrap();
            assert_eq!(built.name(), format!("my_{tool_type}"));
        }
    }
}
