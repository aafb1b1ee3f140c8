//! Pipeline operations exposed as typed tools.
//!
//! Each tool wraps one pipeline operation over the shared [`ServerDeps`], so
//! the same behavior is reachable from the HTTP routes and from
//! `POST /tools/{name}/invoke`.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;

use pipeline::{
    Collection, CollectionStore, DerivationOutcome, DerivationRequest, IngestOutcome, IngestRequest,
    PipelineError, ResearchRequest,
};

use crate::common::{ObjectList, ResearchTaskView};
use crate::kernel::deps::ServerDeps;
use crate::kernel::tools::ToolRegistry;
use crate::kernel::tools::Tool;

// =============================================================================
// Collections
// =============================================================================

/// Tool that ingests strings, files or URLs into a collection.
pub struct InputDataTool {
    deps: Arc<ServerDeps>,
}

impl InputDataTool {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Tool for InputDataTool {
    const NAME: &'static str = "input_data";
    type Args = IngestRequest;
    type Output = IngestOutcome;

    fn description(&self) -> &str {
        "Create or extend a collection from raw strings, files or web page URLs. Each item becomes one entry."
    }

    async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output> {
        self.deps
            .ingester()
            .ingest(self.deps.collections.as_ref(), &args)
            .await
    }
}

/// Arguments naming one collection.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ObjectByNameArgs {
    /// Name of the collection to fetch.
    pub object_name: String,
}

/// Tool that returns one collection with all of its entries.
pub struct ObjectByNameTool {
    deps: Arc<ServerDeps>,
}

impl ObjectByNameTool {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Tool for ObjectByNameTool {
    const NAME: &'static str = "object_by_name";
    type Args = ObjectByNameArgs;
    type Output = Collection;

    fn description(&self) -> &str {
        "Get a collection by name, including every entry with its provenance keys."
    }

    async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output> {
        self.deps.collections.get(&args.object_name).await
    }
}

/// No arguments.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListObjectsArgs {}

/// Tool that lists every collection name.
pub struct ListObjectsTool {
    deps: Arc<ServerDeps>,
}

impl ListObjectsTool {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Tool for ListObjectsTool {
    const NAME: &'static str = "list_objects";
    type Args = ListObjectsArgs;
    type Output = ObjectList;

    fn description(&self) -> &str {
        "List the names of all stored collections."
    }

    async fn call(&self, _args: Self::Args) -> pipeline::Result<Self::Output> {
        let names = self.deps.collections.list_names().await?;
        Ok(ObjectList::new(names))
    }
}

// =============================================================================
// Derivation
// =============================================================================

/// Tool that runs a templated prompt over combinations of input entries.
pub struct ApplyPromptTool {
    deps: Arc<ServerDeps>,
}

impl ApplyPromptTool {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Tool for ApplyPromptTool {
    const NAME: &'static str = "apply_prompt";
    type Args = DerivationRequest;
    type Output = DerivationOutcome;

    fn description(&self) -> &str {
        "Derive new collections by applying a prompt template with {collection} placeholders to input collections. \
         Inputs are used individually, combined into one event, or matched by shared keys."
    }

    async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output> {
        self.deps.deriver().apply(&args).await
    }
}

// =============================================================================
// Research
// =============================================================================

/// Tool that starts a browsing-agent research task.
pub struct ResearchTopicTool {
    deps: Arc<ServerDeps>,
}

impl ResearchTopicTool {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Tool for ResearchTopicTool {
    const NAME: &'static str = "research_topic";
    type Args = ResearchRequest;
    type Output = ResearchTaskView;

    fn description(&self) -> &str {
        "Start a web research task for a goal, returning the requested data fields. \
         The task runs in the background; poll it with research_status."
    }

    async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output> {
        let task = self.deps.research_service().start(&args).await?;
        Ok(ResearchTaskView::started(task))
    }
}

/// Arguments naming one research task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResearchStatusArgs {
    /// Id returned by research_topic.
    pub task_id: String,
}

/// Tool that reports the status of a research task.
pub struct ResearchStatusTool {
    deps: Arc<ServerDeps>,
}

impl ResearchStatusTool {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Tool for ResearchStatusTool {
    const NAME: &'static str = "research_status";
    type Args = ResearchStatusArgs;
    type Output = ResearchTaskView;

    fn description(&self) -> &str {
        "Check the status of a research task and get its output once completed."
    }

    async fn call(&self, args: Self::Args) -> pipeline::Result<Self::Output> {
        let id = Uuid::parse_str(args.task_id.trim())
            .map_err(|e| PipelineError::invalid(format!("invalid task_id: {}", e)))?;

        let service = self.deps.research_service();
        let task = service.status(id).await?;
        Ok(ResearchTaskView::from_task(task, service.config().pending_timeout))
    }
}

/// Registry with every pipeline tool.
pub fn build_tool_registry(deps: Arc<ServerDeps>) -> ToolRegistry {
    ToolRegistry::new()
        .with(InputDataTool::new(deps.clone()))
        .with(ObjectByNameTool::new(deps.clone()))
        .with(ListObjectsTool::new(deps.clone()))
        .with(ApplyPromptTool::new(deps.clone()))
        .with(ResearchTopicTool::new(deps.clone()))
        .with(ResearchStatusTool::new(deps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::testing::{MockFetcher, MockGenerator, MockResearcher};
    use serde_json::json;

    fn deps() -> Arc<ServerDeps> {
        Arc::new(ServerDeps::in_memory(
            Arc::new(MockGenerator::new()),
            Arc::new(MockResearcher::new()),
            Arc::new(MockFetcher::new()),
        ))
    }

    #[test]
    fn test_registry_has_all_tools() {
        let registry = build_tool_registry(deps());
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();

        assert_eq!(
            names,
            vec![
                "apply_prompt",
                "input_data",
                "list_objects",
                "object_by_name",
                "research_status",
                "research_topic",
            ]
        );
    }

    #[tokio::test]
    async fn test_ingest_then_derive_through_tools() {
        let registry = build_tool_registry(deps());

        let ingested = registry
            .invoke(
                "input_data",
                json!({
                    "created_object_name": "reviews",
                    "data_type": "strings",
                    "input_data": ["great", "awful"]
                }),
            )
            .await
            .unwrap();
        assert_eq!(ingested["processed"], 2);

        let derived = registry
            .invoke(
                "apply_prompt",
                json!({
                    "created_object_names": ["sentiment"],
                    "prompt_string": "Sentiment of {reviews}",
                    "inputs": [{"input_object_name": "reviews", "mode": "use_individually"}]
                }),
            )
            .await
            .unwrap();
        assert_eq!(derived["combinations_processed"], 2);

        let listed = registry.invoke("list_objects", json!({})).await.unwrap();
        assert_eq!(listed["total"], 2);

        let sentiment = registry
            .invoke("object_by_name", json!({"object_name": "sentiment"}))
            .await
            .unwrap();
        assert_eq!(sentiment["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_research_status_rejects_bad_id() {
        let registry = build_tool_registry(deps());
        let result = registry
            .invoke("research_status", json!({"task_id": "not-a-uuid"}))
            .await;

        assert!(matches!(
            result,
            Err(crate::kernel::tools::ToolError::Pipeline(
                PipelineError::InvalidRequest { .. }
            ))
        ));
    }
}
