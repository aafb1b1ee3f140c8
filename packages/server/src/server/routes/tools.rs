//! Tool listing and invocation routes.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;

use crate::kernel::ToolDefinition;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ToolList {
    pub tools: Vec<ToolDefinition>,
    pub total: usize,
}

/// `GET /tools`
pub async fn list_tools_handler(Extension(state): Extension<AppState>) -> Json<ToolList> {
    let tools = state.tools.definitions();
    Json(ToolList {
        total: tools.len(),
        tools,
    })
}

/// `POST /tools/:name/invoke` with the tool arguments as the JSON body
pub async fn invoke_tool_handler(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
    Json(arguments): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let output = state.tools.invoke(&name, arguments).await?;
    Ok(Json(output))
}
