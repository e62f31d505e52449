//! Task-management domain model.
//!
//! # Responsibility
//! - Define the persisted record shapes for projects and todos.
//! - Own timestamp and identifier conventions shared by both entity kinds.
//!
//! # Invariants
//! - Record IDs are opaque strings and never reused.
//! - `created_at` is fixed at construction; only `updated_at` moves.
//! - Serialized field names are camelCase to stay readable by existing data.

pub mod project;
pub mod todo;

use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// UTC instant serialized as an RFC 3339 string.
pub type Timestamp = DateTime<Utc>;

/// Returns a fresh opaque identifier for a new record.
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// Persisted entity kinds. Used for error reporting and log metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Todo,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Todo => "todo",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
