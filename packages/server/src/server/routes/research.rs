//! Research task routes.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use pipeline::{ResearchRequest, TaskFilter, TaskStatus, WebhookAck, WebhookPayload};

use crate::common::{ResearchTaskView, TaskSummary};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<TaskSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedTask {
    pub deleted: bool,
    pub task_id: Uuid,
}

/// `POST /research_topic`
pub async fn research_topic_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Result<Json<ResearchTaskView>, ApiError> {
    let task = state.deps.research_service().start(&request).await?;
    Ok(Json(ResearchTaskView::started(task)))
}

/// `GET /research_status/:task_id`
pub async fn research_status_handler(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<ResearchTaskView>, ApiError> {
    let service = state.deps.research_service();
    let task = service.status(task_id).await?;
    Ok(Json(ResearchTaskView::from_task(
        task,
        service.config().pending_timeout,
    )))
}

/// `POST /webhook/research/:task_id`
///
/// Always acknowledged; ids that do not name a pending task are reported as
/// `unknown_task` so the backend does not retry.
pub async fn research_webhook_handler(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let Ok(id) = Uuid::parse_str(&task_id) else {
        tracing::warn!(task_id = %task_id, "Webhook with malformed task id");
        return Ok(Json(WebhookResponse {
            status: "unknown_task",
            task_id,
            task_status: None,
        }));
    };

    let response = match state.deps.research_service().webhook(id, payload).await? {
        WebhookAck::Received(status) => WebhookResponse {
            status: "received",
            task_id,
            task_status: Some(status),
        },
        WebhookAck::UnknownTask => WebhookResponse {
            status: "unknown_task",
            task_id,
            task_status: None,
        },
    };
    Ok(Json(response))
}

/// `GET /tasks/pending`
pub async fn list_pending_tasks_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<TaskList>, ApiError> {
    list_tasks(&state, TaskFilter::Pending).await
}

/// `GET /tasks/completed` - completed, failed and timed-out tasks
pub async fn list_completed_tasks_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<TaskList>, ApiError> {
    list_tasks(&state, TaskFilter::Finished).await
}

/// `DELETE /tasks/:task_id`
pub async fn delete_task_handler(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<DeletedTask>, ApiError> {
    state.deps.research_service().delete(task_id).await?;
    Ok(Json(DeletedTask {
        deleted: true,
        task_id,
    }))
}

async fn list_tasks(state: &AppState, filter: TaskFilter) -> Result<Json<TaskList>, ApiError> {
    let tasks: Vec<TaskSummary> = state
        .deps
        .research_service()
        .list(filter)
        .await?
        .into_iter()
        .map(TaskSummary::from)
        .collect();

    Ok(Json(TaskList {
        total: tasks.len(),
        tasks,
    }))
}
