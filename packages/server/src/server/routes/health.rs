use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use pipeline::CollectionStore;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
    tools: usize,
}

#[derive(Serialize)]
pub struct StoreHealth {
    backend: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    collections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Lists collection names as a store round-trip. Returns 200 OK when the
/// store answers within 5 seconds, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.deps.backend.as_str().to_string();

    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.deps.collections.list_names(),
    )
    .await
    {
        Ok(Ok(names)) => StoreHealth {
            backend,
            status: "ok".to_string(),
            collections: Some(names.len()),
            error: None,
        },
        Ok(Err(e)) => StoreHealth {
            backend,
            status: "error".to_string(),
            collections: None,
            error: Some(format!("Query failed: {}", e)),
        },
        Err(_) => StoreHealth {
            backend,
            status: "error".to_string(),
            collections: None,
            error: Some("Query timeout (>5s)".to_string()),
        },
    };

    let is_healthy = store_health.status == "ok";

    let overall_status = if is_healthy { "healthy" } else { "unhealthy" };

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            store: store_health,
            tools: state.tools.len(),
        }),
    )
}
