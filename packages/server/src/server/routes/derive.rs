//! Apply-prompt route.

use axum::{extract::Extension, Json};

use pipeline::{DerivationOutcome, DerivationRequest};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `POST /apply_prompt`
pub async fn apply_prompt_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<DerivationRequest>,
) -> Result<Json<DerivationOutcome>, ApiError> {
    let outcome = state.deps.deriver().apply(&request).await?;
    Ok(Json(outcome))
}
