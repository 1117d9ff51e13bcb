//! Integration tests for the service locator's singleton lifecycle.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tasksync::locator::{LocatorError, ServiceLocator, StoreConfig};
use tasksync::tasks::{
    adapters::memory::{InMemoryTasksSource, RecordingTasksSource},
    domain::Task,
    ports::{DataSourceResult, TasksDataSource},
};

fn test_config() -> StoreConfig {
    StoreConfig::new("postgres://unused-in-tests")
}

fn in_memory_store_factory(_config: &StoreConfig) -> DataSourceResult<Arc<dyn TasksDataSource>> {
    Ok(Arc::new(InMemoryTasksSource::new()) as Arc<dyn TasksDataSource>)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_constructs_exactly_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    let locator = Arc::new(ServiceLocator::with_store_factory(move |_config| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryTasksSource::new()) as Arc<dyn TasksDataSource>)
    }));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let worker = Arc::clone(&locator);
        handles.push(tokio::spawn(async move {
            worker
                .provide_tasks_repository(&test_config())
                .await
                .expect("provide should succeed")
        }));
    }

    let mut repositories = Vec::new();
    for handle in handles {
        repositories.push(handle.await.expect("task should not panic"));
    }

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for pair in repositories.windows(2) {
        assert!(
            Arc::ptr_eq(&pair[0], &pair[1]),
            "all callers receive the same repository instance"
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_provide_returns_the_existing_instance() {
    let locator = ServiceLocator::with_store_factory(in_memory_store_factory);

    let first = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");
    let second = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test(flavor = "multi_thread")]
async fn installed_store_suppresses_the_factory() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    let locator = ServiceLocator::with_store_factory(move |_config| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryTasksSource::new()) as Arc<dyn TasksDataSource>)
    });

    locator
        .install_local_store(Arc::new(InMemoryTasksSource::new()))
        .await;
    locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");

    assert_eq!(constructions.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_drains_remote_and_clears_and_closes_the_store() {
    let remote = Arc::new(RecordingTasksSource::new(Arc::new(
        InMemoryTasksSource::new(),
    )));
    let store = Arc::new(RecordingTasksSource::new(Arc::new(
        InMemoryTasksSource::new(),
    )));
    let locator = ServiceLocator::with_store_factory(in_memory_store_factory);
    locator
        .install_remote_source(Arc::clone(&remote) as Arc<dyn TasksDataSource>)
        .await;
    locator
        .install_local_store(Arc::clone(&store) as Arc<dyn TasksDataSource>)
        .await;

    let repository = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");
    let task = Task::new("Title1", "Description1");
    repository
        .save_task(&task)
        .await
        .expect("save should succeed");

    locator
        .reset_repository()
        .await
        .expect("reset should succeed");

    assert_eq!(remote.delete_all_calls(), 1);
    assert_eq!(store.delete_all_calls(), 1);
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_then_provide_builds_a_fresh_repository_with_a_cold_cache() {
    let locator = ServiceLocator::with_store_factory(in_memory_store_factory);
    locator
        .install_remote_source(Arc::new(InMemoryTasksSource::with_tasks([Task::new(
            "Title1",
            "Description1",
        )])))
        .await;

    let first = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");
    let warmed = first
        .get_tasks(true)
        .await
        .expect("warm-up fetch should succeed");
    assert_eq!(warmed.len(), 1);

    locator
        .reset_repository()
        .await
        .expect("reset should succeed");

    let second = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");
    assert!(
        !Arc::ptr_eq(&first, &second),
        "reset must yield a fresh repository instance"
    );

    // The surviving remote was drained, so the fresh cold cache fills empty.
    let tasks = second
        .get_tasks(false)
        .await
        .expect("cold read should succeed");
    assert!(tasks.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_clears_handles_even_when_clearing_fails() {
    let store = Arc::new(RecordingTasksSource::new(Arc::new(
        InMemoryTasksSource::new(),
    )));
    let locator = ServiceLocator::with_store_factory(in_memory_store_factory);
    locator
        .install_local_store(Arc::clone(&store) as Arc<dyn TasksDataSource>)
        .await;

    let first = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");

    store.set_unavailable(true);
    let result = locator.reset_repository().await;
    assert!(matches!(result, Err(LocatorError::StoreReset(_))));

    let second = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed after a failed reset");
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_provide_and_reset_stay_coherent() {
    let locator = Arc::new(ServiceLocator::with_store_factory(in_memory_store_factory));

    let mut handles = Vec::new();
    for round in 0..4 {
        let worker = Arc::clone(&locator);
        handles.push(tokio::spawn(async move {
            for _ in 0..8 {
                let repository = worker
                    .provide_tasks_repository(&test_config())
                    .await
                    .expect("provide should succeed");
                let task = Task::new(format!("Round {round}"), "stress");
                repository
                    .save_task(&task)
                    .await
                    .expect("save should succeed");
                worker
                    .reset_repository()
                    .await
                    .expect("reset should succeed");
            }
        }));
    }
    for handle in handles {
        handle.await.expect("task should not panic");
    }

    // After the dust settles the locator still hands out a working pair.
    let repository = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");
    let task = Task::new("Title1", "Description1");
    repository
        .save_task(&task)
        .await
        .expect("save should succeed");
    let fetched = repository
        .get_task(task.id(), false)
        .await
        .expect("read-after-write should succeed");
    assert_eq!(fetched, task);
}

#[tokio::test(flavor = "multi_thread")]
async fn global_locator_provides_and_resets() {
    let locator = tasksync::locator::global();
    locator
        .install_remote_source(Arc::new(InMemoryTasksSource::new()))
        .await;
    locator
        .install_local_store(Arc::new(InMemoryTasksSource::new()))
        .await;

    let repository = locator
        .provide_tasks_repository(&test_config())
        .await
        .expect("provide should succeed");
    let task = Task::new("Title1", "Description1");
    repository
        .save_task(&task)
        .await
        .expect("save should succeed");

    locator
        .reset_repository()
        .await
        .expect("reset should succeed");
}
