//! Project record.
//!
//! A project owns zero or more todos through its todo index. There is no
//! update path for projects; the record is written once and later removed by
//! a cascading delete.

use super::{new_entity_id, Timestamp};
use crate::model::todo::Todo;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Opaque project identifier.
pub type ProjectId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Empty when the caller gave no description.
    #[serde(default)]
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Builds a new project with a generated ID, stamped with the current time.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(new_entity_id(), name, description, Utc::now())
    }

    /// Builds a project with caller-provided identity and creation time.
    ///
    /// `created_at` and `updated_at` are both set to `now`.
    pub fn with_id(
        id: impl Into<ProjectId>,
        name: impl Into<String>,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Read model returned by `get_project`: the record plus its resolved todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithTodos {
    #[serde(flatten)]
    pub project: Project,
    /// Todos in todo-index order. Dangling index entries are omitted.
    pub todos: Vec<Todo>,
}
