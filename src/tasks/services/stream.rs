//! Watch-backed reactive streams over the repository cache.
//!
//! Both stream types buffer exactly one current value: a late subscriber
//! immediately reads the latest published snapshot, and `next` resolves
//! once per subsequent cache change.

use thiserror::Error;

use super::repository::{SnapshotReceiver, TasksRepositoryError, TasksResult};
use crate::tasks::domain::{Task, TaskId};

/// Error returned once a stream's repository has been dropped.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("task update stream closed")]
pub struct StreamClosed;

/// Replay-latest stream of full task-set snapshots.
pub struct TasksStream {
    rx: SnapshotReceiver,
}

impl TasksStream {
    pub(super) const fn new(rx: SnapshotReceiver) -> Self {
        Self { rx }
    }

    /// Returns the latest published snapshot without waiting.
    ///
    /// # Errors
    ///
    /// Returns the published error when the last cold load failed.
    pub fn current(&self) -> TasksResult<Vec<Task>> {
        self.rx.borrow().clone()
    }

    /// Returns whether a snapshot newer than the last one read is pending.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] when the repository has been dropped.
    pub fn has_update(&self) -> Result<bool, StreamClosed> {
        self.rx.has_changed().map_err(|_| StreamClosed)
    }

    /// Waits for the next snapshot and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] when the repository has been dropped.
    pub async fn next(&mut self) -> Result<TasksResult<Vec<Task>>, StreamClosed> {
        self.rx.changed().await.map_err(|_| StreamClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

/// Replay-latest stream scoped to a single task.
pub struct TaskStream {
    rx: SnapshotReceiver,
    id: TaskId,
}

fn select_task(snapshot: &TasksResult<Vec<Task>>, id: TaskId) -> TasksResult<Task> {
    match snapshot {
        Ok(tasks) => tasks
            .iter()
            .find(|task| task.id() == id)
            .cloned()
            .ok_or(TasksRepositoryError::NotFound(id)),
        Err(err) => Err(err.clone()),
    }
}

impl TaskStream {
    pub(super) const fn new(rx: SnapshotReceiver, id: TaskId) -> Self {
        Self { rx, id }
    }

    /// Returns the identifier this stream tracks.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.id
    }

    /// Returns the tracked task from the latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TasksRepositoryError::NotFound`] when the latest snapshot
    /// does not contain the task, or the published error when the last cold
    /// load failed.
    pub fn current(&self) -> TasksResult<Task> {
        select_task(&self.rx.borrow(), self.id)
    }

    /// Returns whether a snapshot newer than the last one read is pending.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] when the repository has been dropped.
    pub fn has_update(&self) -> Result<bool, StreamClosed> {
        self.rx.has_changed().map_err(|_| StreamClosed)
    }

    /// Waits for the next snapshot and returns the tracked task's state in
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] when the repository has been dropped.
    pub async fn next(&mut self) -> Result<TasksResult<Task>, StreamClosed> {
        self.rx.changed().await.map_err(|_| StreamClosed)?;
        let snapshot = self.rx.borrow_and_update().clone();
        Ok(select_task(&snapshot, self.id))
    }
}
