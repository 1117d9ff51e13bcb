//! Error types for task domain parsing.

use thiserror::Error;

/// Error returned while parsing task identifiers from strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid task identifier: {0}")]
pub struct ParseTaskIdError(pub String);
