//! Task entity and completion-state behaviour.

use super::TaskId;
use serde::{Deserialize, Serialize};

/// A single todo-list task.
///
/// The identifier is generated at creation and never changes afterwards;
/// title and description may both be blank for a freshly drafted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    is_completed: bool,
}

impl Task {
    /// Creates a new active task with a freshly generated identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }

    /// Reconstructs a task from persisted fields.
    #[must_use]
    pub fn from_parts(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        is_completed: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            is_completed,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether the task has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns whether the task is still active (not completed).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_completed
    }

    /// Returns whether the task carries no title and no description.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }

    /// Returns the text shown in list views: the title, or the description
    /// when the title is blank.
    #[must_use]
    pub fn title_for_list(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }

    /// Replaces the task title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replaces the task description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Marks the task as completed.
    pub const fn complete(&mut self) {
        self.is_completed = true;
    }

    /// Marks the task as active again.
    pub const fn activate(&mut self) {
        self.is_completed = false;
    }
}
