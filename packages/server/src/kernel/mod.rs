//! Kernel module - server infrastructure and dependencies.

pub mod ai_tools;
pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod tools;

pub use ai_tools::{
    build_tool_registry, ApplyPromptTool, InputDataTool, ListObjectsTool, ObjectByNameTool,
    ResearchStatusTool, ResearchTopicTool,
};
pub use deps::{ServerDeps, StoreBackend};
pub use scheduled_tasks::start_scheduler;
pub use test_dependencies::TestDependencies;
pub use tools::{DynTool, Tool, ToolDefinition, ToolError, ToolRegistry};
