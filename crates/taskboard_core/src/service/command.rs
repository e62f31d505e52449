//! Typed command requests.
//!
//! Commands arrive as JSON objects tagged by `command`, with camelCase
//! argument names:
//!
//! ```json
//! {"command": "create_todo", "projectId": "...", "title": "Write spec"}
//! ```

use crate::model::todo::{StatusFilter, TodoPriority, TodoStatus};
use crate::service::task_service::ServiceError;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Command {
    CreateProject {
        name: String,
        description: Option<String>,
    },
    ListProjects,
    GetProject {
        project_id: String,
    },
    DeleteProject {
        project_id: String,
    },
    CreateTodo {
        project_id: String,
        title: String,
        description: Option<String>,
        priority: Option<TodoPriority>,
    },
    GetTodo {
        todo_id: String,
    },
    ListTodos {
        project_id: String,
        #[serde(default)]
        status: StatusFilter,
    },
    UpdateTodo {
        todo_id: String,
        title: String,
        description: Option<String>,
        status: Option<TodoStatus>,
        priority: Option<TodoPriority>,
    },
    DeleteTodo {
        todo_id: String,
    },
    Audit,
}

impl Command {
    /// Parses a full JSON command object.
    pub fn from_json(raw: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(raw).map_err(|err| ServiceError::InvalidInput(err.to_string()))
    }

    /// Builds a command from its name and an optional JSON object of arguments.
    pub fn from_parts(name: &str, args: Option<&str>) -> Result<Self, ServiceError> {
        let mut object = match args.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(object)) => object,
                Ok(_) => {
                    return Err(ServiceError::InvalidInput(
                        "command arguments must be a JSON object".to_string(),
                    ))
                }
                Err(err) => return Err(ServiceError::InvalidInput(err.to_string())),
            },
            None => Map::new(),
        };
        object.insert("command".to_string(), Value::String(name.to_string()));
        serde_json::from_value(Value::Object(object))
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))
    }

    /// Wire name of this command, used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateProject { .. } => "create_project",
            Self::ListProjects => "list_projects",
            Self::GetProject { .. } => "get_project",
            Self::DeleteProject { .. } => "delete_project",
            Self::CreateTodo { .. } => "create_todo",
            Self::GetTodo { .. } => "get_todo",
            Self::ListTodos { .. } => "list_todos",
            Self::UpdateTodo { .. } => "update_todo",
            Self::DeleteTodo { .. } => "delete_todo",
            Self::Audit => "audit",
        }
    }
}
