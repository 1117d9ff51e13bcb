//! Shared fixtures for tasks-module tests.

use std::sync::Arc;

use crate::tasks::{
    adapters::memory::{InMemoryTasksSource, RecordingTasksSource},
    domain::Task,
    ports::TasksDataSource,
    services::TasksRepository,
};

/// Repository over recorded in-memory sources, with direct handles on the
/// backing state for seeding and assertions that must not disturb the call
/// counters.
pub struct RepositoryFixture {
    pub remote_state: InMemoryTasksSource,
    pub local_state: InMemoryTasksSource,
    pub remote: Arc<RecordingTasksSource>,
    pub local: Arc<RecordingTasksSource>,
    pub repository: TasksRepository,
}

pub fn repository_over(
    remote_tasks: impl IntoIterator<Item = Task>,
    local_tasks: impl IntoIterator<Item = Task>,
) -> RepositoryFixture {
    let remote_state = InMemoryTasksSource::with_tasks(remote_tasks);
    let local_state = InMemoryTasksSource::with_tasks(local_tasks);
    let remote = Arc::new(RecordingTasksSource::new(Arc::new(remote_state.clone())));
    let local = Arc::new(RecordingTasksSource::new(Arc::new(local_state.clone())));
    let repository = TasksRepository::new(
        Arc::clone(&remote) as Arc<dyn TasksDataSource>,
        Arc::clone(&local) as Arc<dyn TasksDataSource>,
    );
    RepositoryFixture {
        remote_state,
        local_state,
        remote,
        local,
        repository,
    }
}

/// Sorts tasks by identifier for deterministic comparisons.
pub fn by_id(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(Task::id);
    tasks
}
