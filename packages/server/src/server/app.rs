//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::{build_tool_registry, ServerDeps, ToolRegistry};
use crate::server::routes::{
    apply_prompt_handler, delete_object_handler, delete_task_handler, get_object_handler,
    health_handler, input_data_handler, invoke_tool_handler, list_completed_tasks_handler,
    list_objects_handler, list_pending_tasks_handler, list_tools_handler, research_status_handler,
    research_topic_handler, research_webhook_handler, return_data_handler, scrape_urls_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        let tools = Arc::new(build_tool_registry(deps.clone()));
        Self { deps, tools }
    }
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>) -> Router {
    let app_state = AppState::new(deps);

    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Collections
        .route("/objects", get(list_objects_handler))
        .route(
            "/objects/:name",
            get(get_object_handler).delete(delete_object_handler),
        )
        .route("/return_data/:name", get(return_data_handler))
        // Ingestion
        .route("/input_data", post(input_data_handler))
        .route("/scrape_urls", post(scrape_urls_handler))
        // Derivation
        .route("/apply_prompt", post(apply_prompt_handler))
        // Research tasks
        .route("/research_topic", post(research_topic_handler))
        .route("/research_status/:task_id", get(research_status_handler))
        .route("/webhook/research/:task_id", post(research_webhook_handler))
        .route("/tasks/pending", get(list_pending_tasks_handler))
        .route("/tasks/completed", get(list_completed_tasks_handler))
        .route("/tasks/:task_id", delete(delete_task_handler))
        // Tools
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name/invoke", post(invoke_tool_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
