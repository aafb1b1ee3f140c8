//! Response shapes shared by HTTP routes and tools.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use pipeline::{ResearchTask, TaskStatus};

/// Poll view of one research task.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchTaskView {
    pub task_id: Uuid,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResearchTaskView {
    pub fn from_task(task: ResearchTask, pending_timeout: Duration) -> Self {
        let message = task.status_message(pending_timeout);
        Self {
            task_id: task.id,
            status: task.status,
            output_data: task.output,
            error: task.error,
            message,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }

    /// View returned right after a task is started.
    pub fn started(task: ResearchTask) -> Self {
        Self {
            task_id: task.id,
            status: task.status,
            output_data: None,
            error: None,
            message: format!(
                "Research task started successfully. Use /research_status/{} to check progress.",
                task.id
            ),
            created_at: task.created_at,
            completed_at: None,
        }
    }
}

/// Short listing entry for the task debugging views.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub task_id: Uuid,
    pub goal: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<ResearchTask> for TaskSummary {
    fn from(task: ResearchTask) -> Self {
        Self {
            task_id: task.id,
            goal: task.goal,
            status: task.status,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}

/// Names of every stored collection.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectList {
    pub objects: Vec<String>,
    pub total: usize,
}

impl ObjectList {
    pub fn new(objects: Vec<String>) -> Self {
        Self {
            total: objects.len(),
            objects,
        }
    }
}
