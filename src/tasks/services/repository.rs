//! Caching task repository coordinating the remote source and local store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::stream::{TaskStream, TasksStream};
use crate::tasks::{
    domain::{Task, TaskId},
    ports::{DataSourceError, TasksDataSource},
};

/// Result type for repository operations.
pub type TasksResult<T> = Result<T, TasksRepositoryError>;

/// Errors returned by repository operations.
#[derive(Debug, Clone, Error)]
pub enum TasksRepositoryError {
    /// The requested task does not exist in any consulted source.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A backing source failed.
    #[error(transparent)]
    Source(#[from] DataSourceError),
}

type TaskCache = Option<BTreeMap<TaskId, Task>>;

pub(super) type SnapshotReceiver = watch::Receiver<TasksResult<Vec<Task>>>;

/// Single point of truth for task reads and writes.
///
/// Reconciles the authoritative remote source with the durable local store
/// behind one API. An in-memory cache mirrors the remote source: cold or
/// forced reads repopulate it wholesale, write-throughs update it entry by
/// entry, and every cache change is published to the watch channel feeding
/// [`TasksStream`] and [`TaskStream`] subscribers.
///
/// Writes treat the remote source as authoritative-first: a remote failure
/// aborts the operation before local state is touched. A local failure after
/// a successful remote write is surfaced but not rolled back; the cache
/// keeps the remote's state.
///
/// The cache lock is internal and never held across awaits; callers are
/// expected to serialise writes through the locator-provided singleton.
pub struct TasksRepository {
    remote: Arc<dyn TasksDataSource>,
    local: Arc<dyn TasksDataSource>,
    cache: RwLock<TaskCache>,
    updates: watch::Sender<TasksResult<Vec<Task>>>,
}

fn cache_poisoned(err: impl ToString) -> TasksRepositoryError {
    DataSourceError::unknown(std::io::Error::other(err.to_string())).into()
}

impl TasksRepository {
    /// Creates a repository over the given remote source and local store.
    ///
    /// The cache starts cold; the first read populates it.
    #[must_use]
    pub fn new(remote: Arc<dyn TasksDataSource>, local: Arc<dyn TasksDataSource>) -> Self {
        let (updates, _) = watch::channel(Ok(Vec::new()));
        Self {
            remote,
            local,
            cache: RwLock::new(None),
            updates,
        }
    }

    /// Returns all tasks.
    ///
    /// With `force_refresh`, or when the cache has never been populated, the
    /// full set is fetched from the remote source; on success the cache is
    /// replaced wholesale and the fetched set is persisted into the local
    /// store (local-only rows are not pruned). Otherwise the cached set is
    /// returned without touching either source.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] when the remote fetch or the
    /// local persist fails. A failed remote fetch leaves the cache exactly
    /// as it was.
    pub async fn get_tasks(&self, force_refresh: bool) -> TasksResult<Vec<Task>> {
        if !force_refresh && let Some(snapshot) = self.cached_snapshot()? {
            return Ok(snapshot);
        }

        let fetched = self.remote.list_tasks().await?;
        debug!(count = fetched.len(), "refreshed task cache from remote");
        let snapshot = self.replace_cache(fetched)?;
        for task in &snapshot {
            if let Err(err) = self.local.upsert_task(task).await {
                warn!(task_id = %task.id(), error = %err, "local store rejected refreshed task");
                return Err(err.into());
            }
        }
        Ok(snapshot)
    }

    /// Returns the task with the given identifier.
    ///
    /// With `force_refresh`, or on a cache miss, the entity is fetched from
    /// the remote source, cached, and persisted into the local store.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::NotFound`] when the task exists in no
    /// consulted source, or [`TasksRepositoryError::Source`] on source
    /// failure.
    pub async fn get_task(&self, id: TaskId, force_refresh: bool) -> TasksResult<Task> {
        if !force_refresh && let Some(task) = self.cached_task(id)? {
            return Ok(task);
        }

        let fetched = self.remote.find_task(id).await?;
        let task = fetched.ok_or(TasksRepositoryError::NotFound(id))?;
        self.cache_task(&task)?;
        self.local.upsert_task(&task).await?;
        Ok(task)
    }

    /// Writes a task through to the remote source and local store.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] when either write fails. A
    /// remote failure aborts before local state or the cache is touched; a
    /// local failure is surfaced after the cache has adopted the remote's
    /// state.
    pub async fn save_task(&self, task: &Task) -> TasksResult<()> {
        self.remote.upsert_task(task).await?;
        let local_outcome = self.local.upsert_task(task).await;
        if let Err(err) = &local_outcome {
            warn!(task_id = %task.id(), error = %err, "local store rejected saved task");
        }
        self.cache_task(task)?;
        local_outcome.map_err(Into::into)
    }

    /// Marks the task as completed and writes it through to both sources.
    ///
    /// # Errors
    ///
    /// Propagates lookup and write-through failures; see [`Self::get_task`]
    /// and [`Self::save_task`].
    pub async fn complete_task(&self, id: TaskId) -> TasksResult<()> {
        let mut task = self.get_task(id, false).await?;
        task.complete();
        self.save_task(&task).await
    }

    /// Marks the task as active and writes it through to both sources.
    ///
    /// # Errors
    ///
    /// Propagates lookup and write-through failures; see [`Self::get_task`]
    /// and [`Self::save_task`].
    pub async fn activate_task(&self, id: TaskId) -> TasksResult<()> {
        let mut task = self.get_task(id, false).await?;
        task.activate();
        self.save_task(&task).await
    }

    /// Removes every completed task from the remote source, the local store,
    /// and the cache.
    ///
    /// Best-effort: the first failure is surfaced and deletions applied up
    /// to that point are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] on the first failing delete.
    pub async fn clear_completed_tasks(&self) -> TasksResult<()> {
        let tasks = self.get_tasks(false).await?;
        let completed: Vec<TaskId> = tasks
            .iter()
            .filter(|task| task.is_completed())
            .map(Task::id)
            .collect();

        for id in completed {
            self.remote.delete_task(id).await?;
            let local_outcome = self.local.delete_task(id).await;
            if let Err(err) = &local_outcome {
                warn!(task_id = %id, error = %err, "local store failed to drop completed task");
            }
            self.evict_task(id)?;
            local_outcome?;
        }
        Ok(())
    }

    /// Deletes the task from the remote source, the local store, and the
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] when either delete fails; a
    /// remote failure aborts before local state or the cache is touched.
    pub async fn delete_task(&self, id: TaskId) -> TasksResult<()> {
        self.remote.delete_task(id).await?;
        let local_outcome = self.local.delete_task(id).await;
        self.evict_task(id)?;
        local_outcome.map_err(Into::into)
    }

    /// Deletes every task from the remote source, the local store, and the
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] when either delete fails; a
    /// remote failure aborts before local state or the cache is touched.
    pub async fn delete_all_tasks(&self) -> TasksResult<()> {
        self.remote.delete_all_tasks().await?;
        let local_outcome = self.local.delete_all_tasks().await;
        self.reset_cache_to_empty()?;
        local_outcome.map_err(Into::into)
    }

    /// Forces a cache repopulation from the remote source.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::get_tasks`] failures; the cache is untouched on
    /// failure.
    pub async fn refresh_tasks(&self) -> TasksResult<()> {
        self.get_tasks(true).await.map(|_| ())
    }

    /// Forces a single-task refetch from the remote source.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::get_task`] failures.
    pub async fn refresh_task(&self, id: TaskId) -> TasksResult<()> {
        self.get_task(id, true).await.map(|_| ())
    }

    /// Subscribes to the full task set with replay-latest semantics.
    ///
    /// A cold cache is loaded as a side effect so the stream's first value
    /// is meaningful; a failed cold load is published so the subscriber
    /// observes it. Later failed refreshes publish nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] when the cache state cannot
    /// be inspected.
    pub async fn observe_tasks(&self) -> TasksResult<TasksStream> {
        if self.cached_snapshot()?.is_none()
            && let Err(err) = self.get_tasks(false).await
        {
            drop(self.updates.send_replace(Err(err)));
        }
        Ok(TasksStream::new(self.updates.subscribe()))
    }

    /// Subscribes to a single task with replay-latest semantics.
    ///
    /// A cache miss triggers a cold single-entity load; when the task exists
    /// nowhere the stream simply reports [`TasksRepositoryError::NotFound`]
    /// until a later write or refresh makes it appear.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::Source`] when the cache state cannot
    /// be inspected.
    pub async fn observe_task(&self, id: TaskId) -> TasksResult<TaskStream> {
        if self.cached_task(id)?.is_none()
            && let Err(err) = self.get_task(id, false).await
        {
            debug!(task_id = %id, error = %err, "cold task lookup failed");
        }
        Ok(TaskStream::new(self.updates.subscribe(), id))
    }

    fn cached_snapshot(&self) -> TasksResult<Option<Vec<Task>>> {
        let cache = self.cache.read().map_err(cache_poisoned)?;
        Ok(cache
            .as_ref()
            .map(|entries| entries.values().cloned().collect()))
    }

    fn cached_task(&self, id: TaskId) -> TasksResult<Option<Task>> {
        let cache = self.cache.read().map_err(cache_poisoned)?;
        Ok(cache.as_ref().and_then(|entries| entries.get(&id)).cloned())
    }

    fn replace_cache(&self, fetched: Vec<Task>) -> TasksResult<Vec<Task>> {
        let mut cache = self.cache.write().map_err(cache_poisoned)?;
        let entries: BTreeMap<TaskId, Task> =
            fetched.into_iter().map(|task| (task.id(), task)).collect();
        let snapshot: Vec<Task> = entries.values().cloned().collect();
        *cache = Some(entries);
        drop(self.updates.send_replace(Ok(snapshot.clone())));
        Ok(snapshot)
    }

    fn cache_task(&self, task: &Task) -> TasksResult<()> {
        let mut cache = self.cache.write().map_err(cache_poisoned)?;
        let entries = cache.get_or_insert_with(BTreeMap::new);
        entries.insert(task.id(), task.clone());
        let snapshot: Vec<Task> = entries.values().cloned().collect();
        drop(self.updates.send_replace(Ok(snapshot)));
        Ok(())
    }

    fn evict_task(&self, id: TaskId) -> TasksResult<()> {
        let mut cache = self.cache.write().map_err(cache_poisoned)?;
        if let Some(entries) = cache.as_mut() {
            entries.remove(&id);
            let snapshot: Vec<Task> = entries.values().cloned().collect();
            drop(self.updates.send_replace(Ok(snapshot)));
        }
        Ok(())
    }

    fn reset_cache_to_empty(&self) -> TasksResult<()> {
        let mut cache = self.cache.write().map_err(cache_poisoned)?;
        *cache = Some(BTreeMap::new());
        drop(self.updates.send_replace(Ok(Vec::new())));
        Ok(())
    }
}
