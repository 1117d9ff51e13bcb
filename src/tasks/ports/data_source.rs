//! Data-source port shared by the remote service and the local entity store.

use crate::tasks::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for data-source operations.
pub type DataSourceResult<T> = Result<T, DataSourceError>;

/// Contract implemented by every task source the repository coordinates.
///
/// This is the minimal capability set the repository actually exercises;
/// richer operations such as completing a task or clearing completed tasks
/// are compositions performed by the repository itself.
#[async_trait]
pub trait TasksDataSource: Send + Sync {
    /// Returns every task held by this source.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the source cannot be reached or the
    /// listing fails.
    async fn list_tasks(&self) -> DataSourceResult<Vec<Task>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist; absence is not an error
    /// at this layer.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the source cannot be reached.
    async fn find_task(&self, id: TaskId) -> DataSourceResult<Option<Task>>;

    /// Inserts or replaces a task, keyed by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the write cannot be applied.
    async fn upsert_task(&self, task: &Task) -> DataSourceResult<()>;

    /// Deletes the task with the given identifier, if present.
    ///
    /// Deleting an absent task is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the delete cannot be applied.
    async fn delete_task(&self, id: TaskId) -> DataSourceResult<()>;

    /// Deletes every task held by this source.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the bulk delete cannot be applied.
    async fn delete_all_tasks(&self) -> DataSourceResult<()>;

    /// Releases any resources backing this source.
    ///
    /// Must be idempotent. Sources without underlying resources keep this
    /// default no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when resource release fails.
    async fn close(&self) -> DataSourceResult<()> {
        Ok(())
    }
}

/// Errors returned by data-source implementations.
#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    /// The source could not be reached or refused the operation.
    #[error("data source unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// An unexpected failure with an opaque cause.
    #[error("data source failure: {0}")]
    Unknown(Arc<dyn std::error::Error + Send + Sync>),
}

impl DataSourceError {
    /// Wraps an I/O or connectivity error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Wraps an opaque failure cause.
    pub fn unknown(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unknown(Arc::new(err))
    }
}
