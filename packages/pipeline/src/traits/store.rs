//! Storage traits for collections and research tasks.
//!
//! - `CollectionStore`: named collections of provenance-tagged entries
//! - `TaskStore`: persisted research tasks with explicit expiry
//!
//! Implementations must make `append` a single atomic write so that
//! concurrent derivations targeting the same collection never lose entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::types::{
    entry::{Collection, Entry},
    research::{ResearchTask, TaskCompletion, TaskFilter},
};

/// Store of named collections.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Fetch a collection with all of its entries.
    async fn find(&self, name: &str) -> Result<Option<Collection>>;

    /// Create an empty collection. No-op if it already exists.
    async fn create(&self, name: &str) -> Result<()>;

    /// Append one entry. Fails with `NotFound` if the collection is missing.
    async fn append(&self, name: &str, entry: Entry) -> Result<()>;

    /// Names of every collection.
    async fn list_names(&self) -> Result<Vec<String>>;

    /// Delete a collection. Returns `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Fetch a collection, failing with `NotFound` when absent.
    async fn get(&self, name: &str) -> Result<Collection> {
        self.find(name)
            .await?
            .ok_or_else(|| PipelineError::not_found(name))
    }

    /// Every collection with its entries.
    async fn list(&self) -> Result<Vec<Collection>> {
        let names = self.list_names().await?;
        let mut collections = Vec::with_capacity(names.len());
        for name in names {
            // Deleted between the two reads; skip it
            if let Some(collection) = self.find(&name).await? {
                collections.push(collection);
            }
        }
        Ok(collections)
    }
}

/// Store of research tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task.
    async fn insert_task(&self, task: &ResearchTask) -> Result<()>;

    /// Fetch a task by id.
    async fn get_task(&self, id: Uuid) -> Result<Option<ResearchTask>>;

    /// Move a pending task to a terminal status.
    ///
    /// Returns the updated task, or `None` when no *pending* task has this
    /// id (unknown, or already finished).
    async fn finish_task(&self, id: Uuid, completion: TaskCompletion)
        -> Result<Option<ResearchTask>>;

    /// List tasks, oldest first.
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<ResearchTask>>;

    /// Delete a task. Returns `false` if it did not exist.
    async fn delete_task(&self, id: Uuid) -> Result<bool>;

    /// Mark every pending task created before `created_before` as timed out.
    async fn expire_pending(
        &self,
        created_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// Delete finished tasks completed before `completed_before`.
    async fn purge_finished(&self, completed_before: DateTime<Utc>) -> Result<usize>;
}

#[async_trait]
impl<T: CollectionStore + ?Sized> CollectionStore for Arc<T> {
    async fn find(&self, name: &str) -> Result<Option<Collection>> {
        (**self).find(name).await
    }

    async fn create(&self, name: &str) -> Result<()> {
        (**self).create(name).await
    }

    async fn append(&self, name: &str, entry: Entry) -> Result<()> {
        (**self).append(name, entry).await
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        (**self).list_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        (**self).delete(name).await
    }

    async fn list(&self) -> Result<Vec<Collection>> {
        (**self).list().await
    }
}

#[async_trait]
impl<T: TaskStore + ?Sized> TaskStore for Arc<T> {
    async fn insert_task(&self, task: &ResearchTask) -> Result<()> {
        (**self).insert_task(task).await
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<ResearchTask>> {
        (**self).get_task(id).await
    }

    async fn finish_task(
        &self,
        id: Uuid,
        completion: TaskCompletion,
    ) -> Result<Option<ResearchTask>> {
        (**self).finish_task(id, completion).await
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<ResearchTask>> {
        (**self).list_tasks(filter).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        (**self).delete_task(id).await
    }

    async fn expire_pending(
        &self,
        created_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        (**self).expire_pending(created_before, now).await
    }

    async fn purge_finished(&self, completed_before: DateTime<Utc>) -> Result<usize> {
        (**self).purge_finished(completed_before).await
    }
}
