//! Collection management routes.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;

use pipeline::{related_collections, Collection, CollectionStore, PipelineError, RelatedReport};

use crate::common::ObjectList;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
pub struct DeletedObject {
    pub deleted: bool,
    pub object_name: String,
}

/// `GET /objects`
pub async fn list_objects_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<ObjectList>, ApiError> {
    let names = state.deps.collections.list_names().await?;
    Ok(Json(ObjectList::new(names)))
}

/// `GET /objects/:name`
pub async fn get_object_handler(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Collection>, ApiError> {
    let collection = state.deps.collections.get(&name).await?;
    Ok(Json(collection))
}

/// `DELETE /objects/:name`
pub async fn delete_object_handler(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeletedObject>, ApiError> {
    if !state.deps.collections.delete(&name).await? {
        return Err(PipelineError::not_found(name).into());
    }

    tracing::info!(collection = %name, "Collection deleted");
    Ok(Json(DeletedObject {
        deleted: true,
        object_name: name,
    }))
}

/// `GET /return_data/:name` - a collection plus every collection sharing keys with it
pub async fn return_data_handler(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RelatedReport>, ApiError> {
    let report = related_collections(state.deps.collections.as_ref(), &name).await?;
    Ok(Json(report))
}
