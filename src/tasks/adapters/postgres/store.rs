//! `PostgreSQL` implementation of the durable task store.

use super::{
    config::StoreConfig,
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::tasks::{
    domain::{Task, TaskId},
    ports::{DataSourceError, DataSourceResult, TasksDataSource},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::RwLock;

/// `PostgreSQL` connection pool type used by the task store.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed durable task store.
///
/// `close` releases the connection pool; subsequent operations fail with
/// [`DataSourceError::Unavailable`] and repeated closes are no-ops.
#[derive(Debug)]
pub struct PostgresTasksStore {
    pool: RwLock<Option<TaskPgPool>>,
}

impl PostgresTasksStore {
    /// Builds a connection pool for the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Unavailable`] when the pool cannot be
    /// established.
    pub fn connect(config: &StoreConfig) -> DataSourceResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.database_url());
        let pool = Pool::builder()
            .max_size(config.max_pool_size())
            .build(manager)
            .map_err(DataSourceError::unavailable)?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: TaskPgPool) -> Self {
        Self {
            pool: RwLock::new(Some(pool)),
        }
    }

    fn checked_pool(&self) -> DataSourceResult<TaskPgPool> {
        let guard = self.pool.read().map_err(pool_poisoned)?;
        guard.as_ref().cloned().ok_or_else(store_closed)
    }

    async fn run_blocking<F, T>(&self, f: F) -> DataSourceResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DataSourceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.checked_pool()?;
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DataSourceError::unavailable)?;
            f(&mut connection)
        })
        .await
        .map_err(DataSourceError::unknown)?
    }
}

fn pool_poisoned(err: impl ToString) -> DataSourceError {
    DataSourceError::unknown(std::io::Error::other(err.to_string()))
}

fn store_closed() -> DataSourceError {
    DataSourceError::unavailable(std::io::Error::other("task store is closed"))
}

fn row_to_task(row: TaskRow) -> Task {
    Task::from_parts(
        TaskId::from_uuid(row.id),
        row.title,
        row.description,
        row.completed,
    )
}

fn task_to_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        completed: task.is_completed(),
    }
}

#[async_trait]
impl TasksDataSource for PostgresTasksStore {
    async fn list_tasks(&self) -> DataSourceResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let rows = tasks::table
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(DataSourceError::unavailable)?;
            Ok(rows.into_iter().map(row_to_task).collect())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> DataSourceResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(DataSourceError::unavailable)?;
            Ok(row.map(row_to_task))
        })
        .await
    }

    async fn upsert_task(&self, task: &Task) -> DataSourceResult<()> {
        let row = task_to_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .on_conflict(tasks::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(DataSourceError::unavailable)?;
            Ok(())
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> DataSourceResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(DataSourceError::unavailable)?;
            Ok(())
        })
        .await
    }

    async fn delete_all_tasks(&self) -> DataSourceResult<()> {
        self.run_blocking(|connection| {
            diesel::delete(tasks::table)
                .execute(connection)
                .map_err(DataSourceError::unavailable)?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> DataSourceResult<()> {
        let mut guard = self.pool.write().map_err(pool_poisoned)?;
        drop(guard.take());
        Ok(())
    }
}
