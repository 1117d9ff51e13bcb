//! Instrumented data-source decorator for tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::tasks::{
    domain::{Task, TaskId},
    ports::{DataSourceError, DataSourceResult, TasksDataSource},
};

/// Wraps any [`TasksDataSource`] with per-operation call counters and a
/// scripted outage switch.
///
/// While unavailable, every operation fails with
/// [`DataSourceError::Unavailable`] without touching the inner source;
/// attempted calls are still counted.
pub struct RecordingTasksSource {
    inner: Arc<dyn TasksDataSource>,
    list_calls: AtomicUsize,
    find_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    delete_all_calls: AtomicUsize,
    close_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl RecordingTasksSource {
    /// Wraps the given source.
    #[must_use]
    pub fn new(inner: Arc<dyn TasksDataSource>) -> Self {
        Self {
            inner,
            list_calls: AtomicUsize::new(0),
            find_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            delete_all_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Switches the scripted outage on or off.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `list_tasks` calls observed.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `find_task` calls observed.
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of `upsert_task` calls observed.
    #[must_use]
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_task` calls observed.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_all_tasks` calls observed.
    #[must_use]
    pub fn delete_all_calls(&self) -> usize {
        self.delete_all_calls.load(Ordering::SeqCst)
    }

    /// Number of `close` calls observed.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> DataSourceResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DataSourceError::unavailable(std::io::Error::other(
                "scripted outage",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TasksDataSource for RecordingTasksSource {
    async fn list_tasks(&self) -> DataSourceResult<Vec<Task>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.inner.list_tasks().await
    }

    async fn find_task(&self, id: TaskId) -> DataSourceResult<Option<Task>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.inner.find_task(id).await
    }

    async fn upsert_task(&self, task: &Task) -> DataSourceResult<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.inner.upsert_task(task).await
    }

    async fn delete_task(&self, id: TaskId) -> DataSourceResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.inner.delete_task(id).await
    }

    async fn delete_all_tasks(&self) -> DataSourceResult<()> {
        self.delete_all_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.inner.delete_all_tasks().await
    }

    async fn close(&self) -> DataSourceResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.inner.close().await
    }
}
