//! Todo record and its status/priority vocabularies.
//!
//! # Invariants
//! - `project_id` is a back-reference; the owning project's todo index is the
//!   source of truth for membership.
//! - New todos always start as `TodoStatus::Pending`.
//! - `apply` never moves `updated_at` backwards and never touches `created_at`.

use super::{new_entity_id, Timestamp};
use crate::model::project::ProjectId;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Opaque todo identifier.
pub type TodoId = String;

/// Todo lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Status filter accepted by todo listing. `All` disables filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusFilter {
    /// Returns the concrete status this filter selects, or `None` for `All`.
    pub fn status(self) -> Option<TodoStatus> {
        match self {
            Self::All => None,
            Self::Pending => Some(TodoStatus::Pending),
            Self::InProgress => Some(TodoStatus::InProgress),
            Self::Completed => Some(TodoStatus::Completed),
        }
    }

    pub fn matches(self, status: TodoStatus) -> bool {
        self.status().map_or(true, |wanted| wanted == status)
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Todo {
    /// Builds a pending todo under `project_id` with a generated ID.
    ///
    /// `priority` falls back to `TodoPriority::Medium`.
    pub fn new(
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Option<TodoPriority>,
    ) -> Self {
        Self::with_id(
            new_entity_id(),
            project_id,
            title,
            description,
            priority,
            Utc::now(),
        )
    }

    pub fn with_id(
        id: impl Into<TodoId>,
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Option<TodoPriority>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            description: description.into(),
            status: TodoStatus::Pending,
            priority: priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// Absent optional fields are left unchanged. `title` is always replaced.
    pub fn apply(&mut self, update: TodoUpdate, now: Timestamp) {
        self.title = update.title;
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        self.updated_at = now.max(self.updated_at);
    }
}

/// Partial update for `update_todo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoUpdate {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
}

impl TodoUpdate {
    /// Update that only replaces the title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TodoPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}
