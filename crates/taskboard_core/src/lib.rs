//! Core of the taskboard task manager.
//!
//! Projects and todos are stored as JSON records in a flat key-value store,
//! with denormalized ID indexes for enumeration. `repo::EntityStore` owns the
//! ordering rules that keep records and indexes in agreement.

pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use kv::{KvError, KvResult, KvStore, MemoryKvStore, SqliteKvStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectId, ProjectWithTodos};
pub use model::todo::{StatusFilter, Todo, TodoId, TodoPriority, TodoStatus, TodoUpdate};
pub use model::EntityKind;
pub use repo::{ConsistencyReport, DanglingTodo, EntityStore, MisfiledTodo, RepoError, RepoResult};
pub use service::command::Command;
pub use service::task_service::{ServiceError, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
