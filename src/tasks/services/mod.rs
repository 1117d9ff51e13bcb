//! Orchestration services: the caching repository and its reactive streams.

mod repository;
mod stream;

pub use repository::{TasksRepository, TasksRepositoryError, TasksResult};
pub use stream::{StreamClosed, TaskStream, TasksStream};
