//! Research task types.
//!
//! A research task wraps one long-running browsing-agent run. It is created
//! `pending`, and moves exactly once to a terminal status: by webhook, by
//! lazy expiry on read, or by the periodic sweep.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::PipelineError;

/// Lifecycle status of a research task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
    Timeout,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Map a status string reported by the research backend.
    ///
    /// Anything that is not a recognised terminal status counts as a failure.
    pub fn from_backend(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "succeeded" | "success" => Self::Completed,
            "timeout" | "timed_out" => Self::Timeout,
            _ => Self::Failed,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "timeout" => Ok(Self::Timeout),
            other => Err(PipelineError::store_msg(format!(
                "unknown task status '{}'",
                other
            ))),
        }
    }
}

/// Request to start a research task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ResearchRequest {
    /// What to find, in natural language
    pub goal: String,

    /// Keys the research result must contain
    pub return_data: Vec<String>,
}

/// A persisted research task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchTask {
    pub id: Uuid,
    pub goal: String,
    pub return_data: Vec<String>,
    pub status: TaskStatus,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResearchTask {
    /// Create a new pending task.
    pub fn pending(goal: impl Into<String>, return_data: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal: goal.into(),
            return_data,
            status: TaskStatus::Pending,
            output: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Override the creation time (for fixtures and expiry tests).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Whether a pending task has outlived `timeout` at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.status == TaskStatus::Pending && now - self.created_at > timeout
    }

    /// Apply a terminal transition. Callers must check the task is pending.
    pub fn finish(&mut self, completion: TaskCompletion) {
        self.status = completion.status;
        self.output = completion.output;
        self.error = completion.error;
        self.completed_at = Some(completion.completed_at);
    }

    /// Human-readable status message for poll responses.
    pub fn status_message(&self, pending_timeout: Duration) -> String {
        match self.status {
            TaskStatus::Pending => {
                "Task is still in progress. Please check again in a few moments.".to_string()
            }
            TaskStatus::Completed => "Task completed successfully".to_string(),
            TaskStatus::Failed => match &self.error {
                Some(error) => format!("Task failed: {}", error),
                None => "Task failed".to_string(),
            },
            TaskStatus::Timeout => format!(
                "Task timed out after {} minutes",
                pending_timeout.num_minutes()
            ),
        }
    }
}

/// A terminal transition for a pending task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompletion {
    pub status: TaskStatus,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl TaskCompletion {
    pub fn completed(output: Option<serde_json::Value>) -> Self {
        Self {
            status: TaskStatus::Completed,
            output,
            error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            output: None,
            error: Some(error.into()),
            completed_at: Utc::now(),
        }
    }

    pub fn timeout(at: DateTime<Utc>) -> Self {
        Self {
            status: TaskStatus::Timeout,
            output: None,
            error: None,
            completed_at: at,
        }
    }
}

/// Which tasks to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    /// Still waiting for a result
    Pending,
    /// Completed, failed or timed out
    Finished,
}

impl TaskFilter {
    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            Self::Pending => status == TaskStatus::Pending,
            Self::Finished => status.is_terminal(),
        }
    }
}

/// Payload posted by the research backend when a task finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl WebhookPayload {
    /// Convert into a terminal transition stamped with the current time.
    pub fn into_completion(self) -> TaskCompletion {
        TaskCompletion {
            status: TaskStatus::from_backend(&self.status),
            output: self.output,
            error: self.error,
            completed_at: Utc::now(),
        }
    }
}

/// How a webhook delivery was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAck {
    /// The task was pending and is now terminal with this status
    Received(TaskStatus),
    /// No pending task with that id
    UnknownTask,
}

/// Counts from one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pending tasks moved to `timeout`
    pub timed_out: usize,
    /// Finished tasks deleted after the retention window
    pub purged: usize,
}
