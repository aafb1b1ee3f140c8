//! Research tasks: long-running browsing-agent runs tracked by poll and
//! webhook.
//!
//! Task state lives in a [`TaskStore`], never in process memory, so tasks
//! survive restarts and are visible to every server instance. A pending task
//! leaves that state exactly once:
//!
//! - the backend posts its result to the task's webhook
//! - a status read finds it older than the pending timeout (lazy expiry)
//! - the periodic [`ResearchService::sweep`] finds it overdue
//!
//! Finished tasks are purged by the sweep after the retention window.

pub mod http;
pub mod prompt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::traits::{researcher::Researcher, store::TaskStore};
use crate::types::{
    config::ResearchConfig,
    research::{
        ResearchRequest, ResearchTask, SweepReport, TaskCompletion, TaskFilter, WebhookAck,
        WebhookPayload,
    },
};

pub use http::HttpResearcher;
pub use prompt::research_prompt;

/// Researcher used when no backend is configured; every start fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledResearcher;

#[async_trait]
impl Researcher for DisabledResearcher {
    async fn start(&self, _prompt: &str, _webhook_url: &str) -> Result<()> {
        Err(PipelineError::Config(
            "research backend is not configured (set RESEARCH_API_URL and RESEARCH_API_KEY)"
                .into(),
        ))
    }
}

/// Starts research runs and tracks their lifecycle.
pub struct ResearchService<T: TaskStore, R: Researcher> {
    tasks: T,
    researcher: R,
    webhook_base_url: String,
    config: ResearchConfig,
}

impl<T: TaskStore, R: Researcher> ResearchService<T, R> {
    pub fn new(tasks: T, researcher: R, webhook_base_url: impl Into<String>) -> Self {
        Self {
            tasks,
            researcher,
            webhook_base_url: webhook_base_url.into().trim_end_matches('/').to_string(),
            config: ResearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Where the backend must post the result for `id`.
    pub fn webhook_url(&self, id: Uuid) -> String {
        format!("{}/webhook/research/{}", self.webhook_base_url, id)
    }

    /// Persist a pending task and submit it to the backend.
    ///
    /// If the backend refuses the run the task is marked failed and the
    /// backend error is returned.
    #[instrument(skip(self, request), fields(goal = %request.goal))]
    pub async fn start(&self, request: &ResearchRequest) -> Result<ResearchTask> {
        if request.goal.trim().is_empty() {
            return Err(PipelineError::invalid("goal must not be empty"));
        }
        if request.return_data.is_empty() {
            return Err(PipelineError::invalid(
                "return_data must name at least one key",
            ));
        }

        let task = ResearchTask::pending(request.goal.trim(), request.return_data.clone());
        self.tasks.insert_task(&task).await?;

        let prompt = research_prompt(&task.goal, &task.return_data);
        if let Err(e) = self.researcher.start(&prompt, &self.webhook_url(task.id)).await {
            warn!(task_id = %task.id, error = %e, "Research backend rejected task");
            self.tasks
                .finish_task(task.id, TaskCompletion::failed(e.to_string()))
                .await?;
            return Err(e);
        }

        info!(task_id = %task.id, "Research task started");
        Ok(task)
    }

    /// Current state of a task, expiring it first if it is overdue.
    pub async fn status(&self, id: Uuid) -> Result<ResearchTask> {
        self.status_at(id, Utc::now()).await
    }

    /// [`status`](Self::status) evaluated at an explicit time.
    pub async fn status_at(&self, id: Uuid, now: DateTime<Utc>) -> Result<ResearchTask> {
        let task = self.require(id).await?;
        if !task.is_overdue(now, self.config.pending_timeout) {
            return Ok(task);
        }

        match self
            .tasks
            .finish_task(id, TaskCompletion::timeout(now))
            .await?
        {
            Some(expired) => {
                info!(task_id = %id, "Research task timed out");
                Ok(expired)
            }
            // Finished concurrently by the webhook or the sweep
            None => self.require(id).await,
        }
    }

    /// Apply a backend result. Only pending tasks transition.
    #[instrument(skip(self, payload), fields(task_id = %id, status = %payload.status))]
    pub async fn webhook(&self, id: Uuid, payload: WebhookPayload) -> Result<WebhookAck> {
        match self.tasks.finish_task(id, payload.into_completion()).await? {
            Some(task) => {
                info!(status = %task.status, "Research webhook received");
                Ok(WebhookAck::Received(task.status))
            }
            None => {
                warn!("Webhook for unknown or finished task");
                Ok(WebhookAck::UnknownTask)
            }
        }
    }

    pub async fn list(&self, filter: TaskFilter) -> Result<Vec<ResearchTask>> {
        self.tasks.list_tasks(filter).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.tasks.delete_task(id).await? {
            Ok(())
        } else {
            Err(PipelineError::TaskNotFound { id })
        }
    }

    /// Time out overdue pending tasks and purge expired finished ones.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let timed_out = self
            .tasks
            .expire_pending(now - self.config.pending_timeout, now)
            .await?;
        let purged = self
            .tasks
            .purge_finished(now - self.config.retention)
            .await?;

        let report = SweepReport { timed_out, purged };
        if timed_out > 0 || purged > 0 {
            info!(timed_out, purged, "Research sweep");
        }
        Ok(report)
    }

    async fn require(&self, id: Uuid) -> Result<ResearchTask> {
        self.tasks
            .get_task(id)
            .await?
            .ok_or(PipelineError::TaskNotFound { id })
    }
}
