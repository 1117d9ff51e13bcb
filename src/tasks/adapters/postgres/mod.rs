//! `PostgreSQL` adapters for durable task persistence.

mod config;
mod models;
mod schema;
mod store;

pub use config::{DATABASE_URL_ENV, StoreConfig, StoreConfigError};
pub use store::{PostgresTasksStore, TaskPgPool};
