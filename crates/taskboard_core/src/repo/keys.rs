//! Storage key naming.
//!
//! These names are shared with previously written data and must not change.

/// Well-known key of the project index.
pub const PROJECT_INDEX_KEY: &str = "projects:list";

pub fn project_key(project_id: &str) -> String {
    format!("project:{project_id}")
}

/// Key of the todo index owned by `project_id`.
pub fn project_todos_key(project_id: &str) -> String {
    format!("project:{project_id}:todos")
}

pub fn todo_key(todo_id: &str) -> String {
    format!("todo:{todo_id}")
}

#[cfg(test)]
mod tests {
    use super::{project_key, project_todos_key, todo_key, PROJECT_INDEX_KEY};

    #[test]
    fn key_names_are_stable() {
        assert_eq!(PROJECT_INDEX_KEY, "projects:list");
        assert_eq!(project_key("abc"), "project:abc");
        assert_eq!(project_todos_key("abc"), "project:abc:todos");
        assert_eq!(todo_key("xyz"), "todo:xyz");
    }

    #[test]
    fn record_and_index_keys_do_not_collide() {
        assert_ne!(project_key("abc"), project_todos_key("abc"));
        assert_ne!(project_key("abc"), todo_key("abc"));
    }
}
