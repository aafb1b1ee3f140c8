//! Ingestion routes.

use axum::{extract::Extension, Json};

use pipeline::{IngestOutcome, IngestRequest, ScrapeOutcome, ScrapeRequest};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `POST /input_data`
pub async fn input_data_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestOutcome>, ApiError> {
    let outcome = state
        .deps
        .ingester()
        .ingest(state.deps.collections.as_ref(), &request)
        .await?;
    Ok(Json(outcome))
}

/// `POST /scrape_urls`
pub async fn scrape_urls_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeOutcome>, ApiError> {
    let outcome = state
        .deps
        .ingester()
        .scrape_urls(state.deps.collections.as_ref(), request)
        .await?;
    Ok(Json(outcome))
}
