//! Task data access for the todo-list application.
//!
//! Reconciles an authoritative remote task source with a durable local
//! store behind a single caching repository, and exposes replay-latest
//! streams over the merged view. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
