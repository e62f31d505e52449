//! Task command service.
//!
//! # Responsibility
//! - Validate command arguments that serde cannot (blank names/titles).
//! - Dispatch to `EntityStore` and encode results as JSON values.
//!
//! # Invariants
//! - Validation failures are raised before any store call.
//! - Store `NotFound` is surfaced as `ServiceError::NotFound`; every other
//!   store error is passed through unchanged as `ServiceError::Store`.

use crate::kv::KvStore;
use crate::model::todo::TodoUpdate;
use crate::model::EntityKind;
use crate::repo::{EntityStore, RepoError};
use crate::service::command::Command;
use log::{info, warn};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for task commands.
#[derive(Debug)]
pub enum ServiceError {
    /// Command shape or argument value rejected at the boundary.
    InvalidInput(String),
    /// Referenced project or todo does not exist.
    NotFound { kind: EntityKind, id: String },
    /// Key-value failure or undecodable stored data.
    Store(RepoError),
    /// Result could not be encoded as JSON.
    Encode(serde_json::Error),
}

impl ServiceError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::Store(_) | Self::Encode(_) => "store_failure",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode result: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Command facade over the entity store.
pub struct TaskService<S: KvStore> {
    store: EntityStore<S>,
}

impl<S: KvStore> TaskService<S> {
    pub fn new(store: EntityStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntityStore<S> {
        &self.store
    }

    /// Executes one command and returns its JSON result.
    pub fn execute(&self, command: Command) -> Result<Value, ServiceError> {
        let started_at = Instant::now();
        let name = command.name();
        let result = self.dispatch(command);
        match &result {
            Ok(_) => info!(
                "event=command module=service status=ok command={} duration_ms={}",
                name,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=command module=service status=error command={} duration_ms={} error_kind={}",
                name,
                started_at.elapsed().as_millis(),
                err.kind()
            ),
        }
        result
    }

    fn dispatch(&self, command: Command) -> Result<Value, ServiceError> {
        match command {
            Command::CreateProject { name, description } => {
                let name = require_text("name", name)?;
                let project = self.store.create_project(name, description)?;
                Ok(serde_json::to_value(project)?)
            }
            Command::ListProjects => Ok(serde_json::to_value(self.store.list_projects()?)?),
            Command::GetProject { project_id } => {
                Ok(serde_json::to_value(self.store.get_project(&project_id)?)?)
            }
            Command::DeleteProject { project_id } => {
                self.store.delete_project(&project_id)?;
                Ok(json!({ "deleted": project_id }))
            }
            Command::CreateTodo {
                project_id,
                title,
                description,
                priority,
            } => {
                let title = require_text("title", title)?;
                let todo = self
                    .store
                    .create_todo(&project_id, title, description, priority)?;
                Ok(serde_json::to_value(todo)?)
            }
            Command::GetTodo { todo_id } => {
                Ok(serde_json::to_value(self.store.get_todo(&todo_id)?)?)
            }
            Command::ListTodos { project_id, status } => Ok(serde_json::to_value(
                self.store.list_todos(&project_id, status)?,
            )?),
            Command::UpdateTodo {
                todo_id,
                title,
                description,
                status,
                priority,
            } => {
                let update = TodoUpdate {
                    title: require_text("title", title)?,
                    description,
                    status,
                    priority,
                };
                Ok(serde_json::to_value(self.store.update_todo(&todo_id, update)?)?)
            }
            Command::DeleteTodo { todo_id } => {
                self.store.delete_todo(&todo_id)?;
                Ok(json!({ "deleted": todo_id }))
            }
            Command::Audit => Ok(serde_json::to_value(self.store.audit()?)?),
        }
    }
}

/// Rejects whitespace-only text. Accepted values are stored as given.
fn require_text(field: &'static str, value: String) -> Result<String, ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "`{field}` must not be blank"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, TaskService};
    use crate::kv::MemoryKvStore;
    use crate::repo::EntityStore;
    use crate::service::command::Command;

    fn service() -> TaskService<MemoryKvStore> {
        TaskService::new(EntityStore::new(MemoryKvStore::new()))
    }

    #[test]
    fn blank_project_name_writes_nothing() {
        let service = service();
        let err = service
            .execute(Command::CreateProject {
                name: "   ".to_string(),
                description: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert!(service.store().kv().is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_preserved() {
        let service = service();
        let project = service
            .execute(Command::CreateProject {
                name: " Launch ".to_string(),
                description: None,
            })
            .unwrap();
        assert_eq!(project["name"], " Launch ");

        let project_id = project["id"].as_str().unwrap().to_string();
        let todo = service
            .execute(Command::CreateTodo {
                project_id: project_id.clone(),
                title: "Write spec\n".to_string(),
                description: None,
                priority: None,
            })
            .unwrap();
        assert_eq!(todo["title"], "Write spec\n");

        let stored = service.store().get_project(&project_id).unwrap();
        assert_eq!(stored.project.name, " Launch ");
    }

    #[test]
    fn not_found_is_mapped_with_kind_and_id() {
        let err = service()
            .execute(Command::GetTodo {
                todo_id: "t-404".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { ref id, .. } if id == "t-404"));
        assert_eq!(err.to_string(), "todo not found: t-404");
    }

    #[test]
    fn get_project_embeds_todos() {
        let service = service();
        let project = service
            .execute(Command::CreateProject {
                name: "Launch".to_string(),
                description: Some("Q3".to_string()),
            })
            .unwrap();
        let project_id = project["id"].as_str().unwrap().to_string();

        service
            .execute(Command::CreateTodo {
                project_id: project_id.clone(),
                title: "Write spec".to_string(),
                description: None,
                priority: None,
            })
            .unwrap();

        let details = service
            .execute(Command::GetProject {
                project_id: project_id.clone(),
            })
            .unwrap();
        assert_eq!(details["name"], "Launch");
        assert_eq!(details["description"], "Q3");
        assert_eq!(details["todos"][0]["title"], "Write spec");
        assert_eq!(details["todos"][0]["priority"], "medium");
        assert_eq!(details["todos"][0]["projectId"], project_id.as_str());
    }

    #[test]
    fn delete_returns_deleted_id() {
        let service = service();
        let project = service
            .execute(Command::CreateProject {
                name: "Launch".to_string(),
                description: None,
            })
            .unwrap();
        let project_id = project["id"].as_str().unwrap().to_string();

        let result = service
            .execute(Command::DeleteProject {
                project_id: project_id.clone(),
            })
            .unwrap();
        assert_eq!(result["deleted"], project_id.as_str());

        let audit = service.execute(Command::Audit).unwrap();
        assert_eq!(audit["projectsChecked"], 0);
    }
}
