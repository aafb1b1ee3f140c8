//! Typed tool trait and registry.
//!
//! A tool declares its argument and output types; the registry stores the
//! type-erased form so tools can be listed with their JSON schema and
//! invoked with JSON arguments.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct ObjectByNameArgs {
//!     object_name: String,
//! }
//!
//! #[async_trait]
//! impl Tool for ObjectByNameTool {
//!     const NAME: &'static str = "object_by_name";
//!     type Args = ObjectByNameArgs;
//!     type Output = Collection;
//!
//!     fn description(&self) -> &str { "Get a collection by name" }
//!
//!     async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output> {
//!         self.store.get(&args.object_name).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use pipeline::PipelineError;

/// A tool with typed arguments and output.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    const NAME: &'static str;

    /// Argument type (must derive `Deserialize` and `JsonSchema`).
    type Args: DeserializeOwned + JsonSchema + Send;

    /// Output type (must derive `Serialize`).
    type Output: Serialize + Send;

    /// What this tool does.
    fn description(&self) -> &str;

    /// Execute the tool.
    async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output>;

    /// Name, description and parameter schema.
    fn definition(&self) -> ToolDefinition {
        let schema = schemars::schema_for!(Self::Args);
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: self.description().to_string(),
            parameters: serde_json::to_value(schema).unwrap_or_default(),
        }
    }
}

/// Public description of a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Error type for erased tool calls.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("Unknown tool: {0}")]
    Unknown(String),

    /// Failed to parse tool arguments.
    #[error("Failed to parse arguments: {0}")]
    InvalidArgs(String),

    /// The tool ran and failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Failed to serialize tool output.
    #[error("Failed to serialize output: {0}")]
    OutputSerialize(String),
}

/// Object-safe form of [`Tool`].
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn definition(&self) -> ToolDefinition;

    /// Execute with JSON arguments, returning JSON output.
    async fn call_json(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_json(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: T::Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let output = self.call(args).await?;

        serde_json::to_value(&output).map_err(|e| ToolError::OutputSerialize(e.to_string()))
    }
}

/// Tools by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.tools.insert(T::NAME, Arc::new(tool));
        self
    }

    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DynTool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions of every tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;

        tracing::info!(tool = %name, "Invoking tool");
        tool.call_json(arguments).await
    }
}
