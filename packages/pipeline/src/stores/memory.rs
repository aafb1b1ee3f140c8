//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::traits::store::{CollectionStore, TaskStore};
use crate::types::{
    entry::{Collection, Entry},
    research::{ResearchTask, TaskCompletion, TaskFilter, TaskStatus},
};

/// In-memory storage for collections and research tasks.
///
/// Collections keep creation order. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<IndexMap<String, Vec<Entry>>>,
    tasks: RwLock<IndexMap<Uuid, ResearchTask>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| PipelineError::store_msg("memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| PipelineError::store_msg("memory store lock poisoned"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored collections.
    pub fn collection_count(&self) -> usize {
        read(&self.collections).map(|c| c.len()).unwrap_or(0)
    }

    /// Number of stored research tasks.
    pub fn task_count(&self) -> usize {
        read(&self.tasks).map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn find(&self, name: &str) -> Result<Option<Collection>> {
        Ok(read(&self.collections)?.get(name).map(|entries| Collection {
            name: name.to_string(),
            entries: entries.clone(),
        }))
    }

    async fn create(&self, name: &str) -> Result<()> {
        write(&self.collections)?
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn append(&self, name: &str, entry: Entry) -> Result<()> {
        write(&self.collections)?
            .get_mut(name)
            .ok_or_else(|| PipelineError::not_found(name))?
            .push(entry);
        Ok(())
    }

    async fn list_names(&self) -> Result<Vec<String>> {
        Ok(read(&self.collections)?.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(write(&self.collections)?.shift_remove(name).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &ResearchTask) -> Result<()> {
        write(&self.tasks)?.insert(task.id, task.clone());
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<ResearchTask>> {
        Ok(read(&self.tasks)?.get(&id).cloned())
    }

    async fn finish_task(
        &self,
        id: Uuid,
        completion: TaskCompletion,
    ) -> Result<Option<ResearchTask>> {
        let mut tasks = write(&self.tasks)?;
        match tasks.get_mut(&id) {
            Some(task) if task.status == TaskStatus::Pending => {
                task.finish(completion);
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<ResearchTask>> {
        let mut tasks: Vec<ResearchTask> = read(&self.tasks)?
            .values()
            .filter(|t| filter.matches(t.status))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        Ok(write(&self.tasks)?.shift_remove(&id).is_some())
    }

    async fn expire_pending(
        &self,
        created_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut tasks = write(&self.tasks)?;
        let mut expired = 0;
        for task in tasks.values_mut() {
            if task.status == TaskStatus::Pending && task.created_at < created_before {
                task.finish(TaskCompletion::timeout(now));
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn purge_finished(&self, completed_before: DateTime<Utc>) -> Result<usize> {
        let mut tasks = write(&self.tasks)?;
        let before = tasks.len();
        tasks.retain(|_, t| {
            !(t.status.is_terminal() && t.completed_at.is_some_and(|at| at < completed_before))
        });
        Ok(before - tasks.len())
    }
}
