//! Tasksync: data-access layer for a todo-list task manager.
//!
//! The crate reconciles two asynchronous task sources (an authoritative
//! remote service and a durable local store) behind one caching repository,
//! and coordinates exactly-once construction of the store/repository
//! singleton pair under concurrent access.
//!
//! # Architecture
//!
//! The tasks module follows hexagonal architecture principles:
//!
//! - **Domain**: pure task types with no infrastructure dependencies
//! - **Ports**: the data-source trait both backing sources implement
//! - **Adapters**: in-memory and `PostgreSQL` implementations of the port
//! - **Services**: the caching repository and its reactive streams
//!
//! The [`locator`] module is the composition root: it owns the process-wide
//! singleton handles and their reset-to-uninitialized lifecycle.

pub mod locator;
pub mod tasks;
