//! Port contracts for task data access.
//!
//! Ports define infrastructure-agnostic interfaces consumed by the
//! repository service.

pub mod data_source;

pub use data_source::{DataSourceError, DataSourceResult, TasksDataSource};
