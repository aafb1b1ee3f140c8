//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (RESEARCH_SWEEP_CRON, every 30 minutes by default)
//!     │
//!     └─► ResearchService::sweep(now)
//!             ├─► pending tasks past the timeout → timeout
//!             └─► finished tasks past retention → deleted
//! ```

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::kernel::deps::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: Arc<ServerDeps>, sweep_cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_job = Job::new_async(sweep_cron, move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            if let Err(e) = run_research_sweep(&deps).await {
                tracing::error!("Research sweep task failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!(cron = %sweep_cron, "Scheduled tasks started (research sweep)");
    Ok(scheduler)
}

/// Expire overdue research tasks and purge old finished ones.
pub async fn run_research_sweep(deps: &ServerDeps) -> Result<()> {
    tracing::info!("Running research sweep");

    let report = deps.research_service().sweep(Utc::now()).await?;

    tracing::info!(
        timed_out = report.timed_out,
        purged = report.purged,
        "Research sweep completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pipeline::testing::{MockFetcher, MockGenerator, MockResearcher};
    use pipeline::{ResearchTask, TaskStatus, TaskStore};

    #[tokio::test]
    async fn test_sweep_times_out_overdue_tasks() {
        let deps = ServerDeps::in_memory(
            Arc::new(MockGenerator::new()),
            Arc::new(MockResearcher::new()),
            Arc::new(MockFetcher::new()),
        );

        let stale = ResearchTask::pending("old goal", vec!["email".into()])
            .with_created_at(Utc::now() - Duration::hours(2));
        deps.tasks.insert_task(&stale).await.unwrap();

        run_research_sweep(&deps).await.unwrap();

        let task = deps.tasks.get_task(stale.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Timeout);
    }
}
