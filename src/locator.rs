//! Process-wide service locator for the tasks repository.
//!
//! Provides exactly-once, mutually-exclusive construction of the persistent
//! store and repository singletons, plus a reset operation that returns the
//! locator to its uninitialized state for test isolation. One async mutex
//! covers every check-then-create sequence, so concurrent first callers and
//! resets never race each other.

use std::sync::Arc;

use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::tasks::{
    adapters::{memory::InMemoryTasksSource, postgres::PostgresTasksStore},
    ports::{DataSourceError, DataSourceResult, TasksDataSource},
    services::TasksRepository,
};

pub use crate::tasks::adapters::postgres::{StoreConfig, StoreConfigError};

/// Result type for locator operations.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Errors returned by locator operations.
#[derive(Debug, Clone, Error)]
pub enum LocatorError {
    /// The persistent store could not be constructed.
    #[error("failed to initialise the task store: {0}")]
    StoreInit(#[source] DataSourceError),

    /// Draining the remote source during reset failed.
    #[error("failed to drain the remote source during reset: {0}")]
    RemoteReset(#[source] DataSourceError),

    /// Clearing or closing the persistent store during reset failed.
    #[error("failed to clear the task store during reset: {0}")]
    StoreReset(#[source] DataSourceError),
}

type StoreFactory =
    Box<dyn Fn(&StoreConfig) -> DataSourceResult<Arc<dyn TasksDataSource>> + Send + Sync>;

#[derive(Default)]
struct LocatorState {
    remote: Option<Arc<dyn TasksDataSource>>,
    store: Option<Arc<dyn TasksDataSource>>,
    repository: Option<Arc<TasksRepository>>,
}

/// Lazily-constructed singleton holder for the store and repository pair.
pub struct ServiceLocator {
    store_factory: StoreFactory,
    state: Mutex<LocatorState>,
}

impl ServiceLocator {
    /// Creates a locator whose persistent store is a
    /// [`PostgresTasksStore`] built from the config handed to
    /// [`Self::provide_tasks_repository`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_store_factory(|config| {
            PostgresTasksStore::connect(config)
                .map(|store| Arc::new(store) as Arc<dyn TasksDataSource>)
        })
    }

    /// Creates a locator with a custom store factory.
    ///
    /// The factory runs at most once per construction cycle; tests inject a
    /// counting factory here to assert exactly-once store construction.
    pub fn with_store_factory<F>(factory: F) -> Self
    where
        F: Fn(&StoreConfig) -> DataSourceResult<Arc<dyn TasksDataSource>> + Send + Sync + 'static,
    {
        Self {
            store_factory: Box::new(factory),
            state: Mutex::new(LocatorState::default()),
        }
    }

    /// Substitutes the remote source used by subsequent constructions.
    ///
    /// Call before the first [`Self::provide_tasks_repository`] or after a
    /// reset; an already-built repository keeps the source it was built
    /// with.
    pub async fn install_remote_source(&self, source: Arc<dyn TasksDataSource>) {
        let mut state = self.state.lock().await;
        state.remote = Some(source);
    }

    /// Substitutes the local store used by subsequent constructions.
    ///
    /// Call before the first [`Self::provide_tasks_repository`] or after a
    /// reset; when a store is installed the store factory is never invoked.
    pub async fn install_local_store(&self, store: Arc<dyn TasksDataSource>) {
        let mut state = self.state.lock().await;
        state.store = Some(store);
    }

    /// Returns the repository singleton, constructing it on first use.
    ///
    /// Construction obtains-or-creates the persistent store via the store
    /// factory, pairs it with the remote source (an [`InMemoryTasksSource`]
    /// stand-in unless one was installed), and publishes the resulting
    /// repository as the process-wide handle. All concurrent first callers
    /// receive the same instance; `config` is consumed only by the call
    /// that actually constructs the store.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::StoreInit`] when the store factory fails.
    pub async fn provide_tasks_repository(
        &self,
        config: &StoreConfig,
    ) -> LocatorResult<Arc<TasksRepository>> {
        let mut state = self.state.lock().await;
        if let Some(repository) = &state.repository {
            return Ok(Arc::clone(repository));
        }

        debug!("constructing tasks repository");
        let remote = Arc::clone(state.remote.get_or_insert_with(|| {
            Arc::new(InMemoryTasksSource::new()) as Arc<dyn TasksDataSource>
        }));
        let store = if let Some(store) = &state.store {
            Arc::clone(store)
        } else {
            let built = (self.store_factory)(config).map_err(LocatorError::StoreInit)?;
            state.store = Some(Arc::clone(&built));
            built
        };

        let repository = Arc::new(TasksRepository::new(remote, store));
        state.repository = Some(Arc::clone(&repository));
        Ok(repository)
    }

    /// Tears the singletons down for test isolation.
    ///
    /// Drains the remote source, clears and closes the persistent store if
    /// one exists, then resets both the store and repository handles to
    /// uninitialized. The remote handle itself survives, drained. Handles
    /// are cleared even when draining or clearing fails, so a subsequent
    /// provide always starts fresh.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::RemoteReset`] or [`LocatorError::StoreReset`]
    /// for the first side that failed.
    pub async fn reset_repository(&self) -> LocatorResult<()> {
        let mut state = self.state.lock().await;
        debug!("resetting tasks repository");

        let mut drained = Ok(());
        if let Some(remote) = state.remote.as_deref() {
            drained = remote
                .delete_all_tasks()
                .await
                .map_err(LocatorError::RemoteReset);
        }
        let mut cleared = Ok(());
        if let Some(store) = state.store.as_deref() {
            cleared = clear_and_close(store)
                .await
                .map_err(LocatorError::StoreReset);
        }

        state.store = None;
        state.repository = None;
        drained.and(cleared)
    }
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::new()
    }
}

async fn clear_and_close(store: &dyn TasksDataSource) -> DataSourceResult<()> {
    store.delete_all_tasks().await?;
    store.close().await
}

static GLOBAL_LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

/// Returns the process-wide locator instance.
#[must_use]
pub fn global() -> &'static ServiceLocator {
    &GLOBAL_LOCATOR
}
