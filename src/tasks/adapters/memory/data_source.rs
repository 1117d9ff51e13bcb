//! In-memory task source.
//!
//! Serves two roles: the deterministic fake used throughout the test suite,
//! and the stand-in remote service installed by the locator when no real
//! remote has been configured. An optional artificial latency mimics a
//! higher-latency service endpoint.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::tasks::{
    domain::{Task, TaskId},
    ports::{DataSourceError, DataSourceResult, TasksDataSource},
};

/// Thread-safe in-memory task source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTasksSource {
    state: Arc<RwLock<BTreeMap<TaskId, Task>>>,
    latency: Option<Duration>,
}

impl InMemoryTasksSource {
    /// Creates an empty in-memory source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-populated with the given tasks.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let state = tasks.into_iter().map(|task| (task.id(), task)).collect();
        Self {
            state: Arc::new(RwLock::new(state)),
            latency: None,
        }
    }

    /// Adds an artificial delay before every operation completes.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn state_poisoned(err: impl ToString) -> DataSourceError {
    DataSourceError::unknown(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TasksDataSource for InMemoryTasksSource {
    async fn list_tasks(&self) -> DataSourceResult<Vec<Task>> {
        self.simulate_latency().await;
        let state = self.state.read().map_err(state_poisoned)?;
        Ok(state.values().cloned().collect())
    }

    async fn find_task(&self, id: TaskId) -> DataSourceResult<Option<Task>> {
        self.simulate_latency().await;
        let state = self.state.read().map_err(state_poisoned)?;
        Ok(state.get(&id).cloned())
    }

    async fn upsert_task(&self, task: &Task) -> DataSourceResult<()> {
        self.simulate_latency().await;
        let mut state = self.state.write().map_err(state_poisoned)?;
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> DataSourceResult<()> {
        self.simulate_latency().await;
        let mut state = self.state.write().map_err(state_poisoned)?;
        state.remove(&id);
        Ok(())
    }

    async fn delete_all_tasks(&self) -> DataSourceResult<()> {
        self.simulate_latency().await;
        let mut state = self.state.write().map_err(state_poisoned)?;
        state.clear();
        Ok(())
    }
}
