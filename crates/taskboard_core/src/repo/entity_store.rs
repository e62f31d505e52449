//! Entity index store: project/todo records plus their list indexes.
//!
//! # Responsibility
//! - Implement create/get/list/update/delete for projects and todos.
//! - Keep the project index and per-project todo indexes in step with the
//!   records they enumerate.
//!
//! # Invariants
//! - Creates write the record first, then append to the index. A failed
//!   append leaves a record reachable by ID but missing from listings.
//! - Deletes remove index membership before (todo) or after (project) the
//!   record so that an interrupted delete never leaves a live todo without a
//!   live project.
//! - `NotFound` checks run before any write.
//! - Listings skip dangling IDs and log `index_skip_missing`.
//!
//! # Concurrency
//! - Index rewrites for the same key are serialized within one store value
//!   via `IndexLocks`. Writers sharing the backend from another process can
//!   still lose appends; no retry is attempted.
//! - `create_todo` and `delete_project` both hold the project's todo-index
//!   slot while they check or remove the project record. A todo is either
//!   created before the cascade and deleted by it, or rejected with
//!   `NotFound` after it.

use super::codec::{decode_index, decode_record, encode_index, encode_record};
use super::error::{RepoError, RepoResult};
use super::index_lock::{hold, IndexLocks};
use super::keys::{project_key, project_todos_key, todo_key, PROJECT_INDEX_KEY};
use crate::kv::KvStore;
use crate::model::project::{Project, ProjectId, ProjectWithTodos};
use crate::model::todo::{StatusFilter, Todo, TodoId, TodoPriority, TodoUpdate};
use crate::model::EntityKind;
use chrono::Utc;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

/// Entity store layered on a single-key store.
pub struct EntityStore<S: KvStore> {
    kv: S,
    locks: IndexLocks,
}

impl<S: KvStore> EntityStore<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            locks: IndexLocks::default(),
        }
    }

    /// Underlying key-value store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Creates a project and appends it to the project index.
    pub fn create_project(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> RepoResult<Project> {
        let project = Project::new(name, description.unwrap_or_default());
        self.put_record(&project_key(&project.id), &project)?;
        self.append_to_index(PROJECT_INDEX_KEY, &project.id)?;

        info!(
            "event=project_create module=repo status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    /// Lists projects in project-index order.
    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.resolve_index(PROJECT_INDEX_KEY, EntityKind::Project, project_key)
    }

    /// Loads one project with its todos.
    pub fn get_project(&self, id: &str) -> RepoResult<ProjectWithTodos> {
        let project = self.require_project(id)?;
        let todos = self.resolve_index(&project_todos_key(id), EntityKind::Todo, todo_key)?;
        Ok(ProjectWithTodos { project, todos })
    }

    /// Deletes a project, its todos and its todo index.
    ///
    /// Order: todo records, todo index, project record, project index entry.
    pub fn delete_project(&self, id: &str) -> RepoResult<()> {
        let todos_key = project_todos_key(id);
        let mut deleted_todos = 0usize;
        let mut skipped_todos = 0usize;
        {
            let slot = self.locks.slot(&todos_key);
            let _guard = hold(&slot);
            self.require_project(id)?;

            for todo_id in self.read_index(&todos_key)? {
                let key = todo_key(&todo_id);
                if self.kv.get(&key)?.is_none() {
                    skipped_todos += 1;
                    continue;
                }
                self.kv.delete(&key)?;
                deleted_todos += 1;
            }
            self.kv.delete(&todos_key)?;
            self.kv.delete(&project_key(id))?;
        }

        self.remove_from_index(PROJECT_INDEX_KEY, id)?;

        info!(
            "event=project_delete module=repo status=ok project_id={} deleted_todos={} skipped_todos={}",
            id, deleted_todos, skipped_todos
        );
        Ok(())
    }

    /// Creates a pending todo under an existing project.
    pub fn create_todo(
        &self,
        project_id: &str,
        title: impl Into<String>,
        description: Option<String>,
        priority: Option<TodoPriority>,
    ) -> RepoResult<Todo> {
        let todos_key = project_todos_key(project_id);
        let slot = self.locks.slot(&todos_key);
        let _guard = hold(&slot);
        self.require_project(project_id)?;

        let todo = Todo::new(project_id, title, description.unwrap_or_default(), priority);
        self.put_record(&todo_key(&todo.id), &todo)?;
        self.rewrite_index(&todos_key, "append", &todo.id, |ids| append_id(ids, &todo.id))?;

        info!(
            "event=todo_create module=repo status=ok project_id={} todo_id={}",
            project_id, todo.id
        );
        Ok(todo)
    }

    pub fn get_todo(&self, id: &str) -> RepoResult<Todo> {
        self.require_todo(id)
    }

    /// Lists a project's todos in index order, optionally filtered by status.
    pub fn list_todos(&self, project_id: &str, filter: StatusFilter) -> RepoResult<Vec<Todo>> {
        self.require_project(project_id)?;
        let mut todos: Vec<Todo> =
            self.resolve_index(&project_todos_key(project_id), EntityKind::Todo, todo_key)?;
        todos.retain(|todo| filter.matches(todo.status));
        Ok(todos)
    }

    /// Applies a partial update. Index membership is unchanged.
    pub fn update_todo(&self, id: &str, update: TodoUpdate) -> RepoResult<Todo> {
        let mut todo = self.require_todo(id)?;
        todo.apply(update, Utc::now());
        self.put_record(&todo_key(id), &todo)?;

        info!(
            "event=todo_update module=repo status=ok todo_id={} status_value={}",
            id,
            todo.status.as_str()
        );
        Ok(todo)
    }

    /// Removes a todo from its project's index, then deletes the record.
    pub fn delete_todo(&self, id: &str) -> RepoResult<()> {
        let todo = self.require_todo(id)?;
        self.remove_from_index(&project_todos_key(&todo.project_id), id)?;
        self.kv.delete(&todo_key(id))?;

        info!(
            "event=todo_delete module=repo status=ok project_id={} todo_id={}",
            todo.project_id, id
        );
        Ok(())
    }

    /// Walks every index and reports entries that break record/index agreement.
    ///
    /// Read-only. Records that were written but never indexed are not visible
    /// here because the key-value contract has no key enumeration.
    pub fn audit(&self) -> RepoResult<ConsistencyReport> {
        let mut report = ConsistencyReport::default();

        let project_ids = self.read_index(PROJECT_INDEX_KEY)?;
        report.collect_duplicates(PROJECT_INDEX_KEY, &project_ids);

        let mut seen_projects = HashSet::new();
        for project_id in project_ids {
            if !seen_projects.insert(project_id.clone()) {
                continue;
            }
            report.projects_checked += 1;
            if self
                .get_record::<Project>(&project_key(&project_id))?
                .is_none()
            {
                report.dangling_project_ids.push(project_id.clone());
            }

            let todos_key = project_todos_key(&project_id);
            let todo_ids = self.read_index(&todos_key)?;
            report.collect_duplicates(&todos_key, &todo_ids);

            for todo_id in todo_ids {
                match self.get_record::<Todo>(&todo_key(&todo_id))? {
                    None => report.dangling_todos.push(DanglingTodo {
                        project_id: project_id.clone(),
                        todo_id,
                    }),
                    Some(todo) if todo.project_id != project_id => {
                        report.misfiled_todos.push(MisfiledTodo {
                            todo_id,
                            listed_under: project_id.clone(),
                            project_id: todo.project_id,
                        })
                    }
                    Some(_) => report.todos_checked += 1,
                }
            }
        }

        if report.is_consistent() {
            info!(
                "event=audit module=repo status=ok projects={} todos={}",
                report.projects_checked, report.todos_checked
            );
        } else {
            warn!(
                "event=audit module=repo status=inconsistent projects={} todos={} dangling_projects={} dangling_todos={} misfiled_todos={} duplicate_entries={}",
                report.projects_checked,
                report.todos_checked,
                report.dangling_project_ids.len(),
                report.dangling_todos.len(),
                report.misfiled_todos.len(),
                report.duplicate_entries.len()
            );
        }
        Ok(report)
    }

    fn require_project(&self, id: &str) -> RepoResult<Project> {
        self.get_record(&project_key(id))?
            .ok_or_else(|| RepoError::not_found(EntityKind::Project, id))
    }

    fn require_todo(&self, id: &str) -> RepoResult<Todo> {
        self.get_record(&todo_key(id))?
            .ok_or_else(|| RepoError::not_found(EntityKind::Todo, id))
    }

    fn get_record<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>> {
        match self.kv.get(key)? {
            Some(raw) => decode_record(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn put_record<T: Serialize>(&self, key: &str, record: &T) -> RepoResult<()> {
        let raw = encode_record(key, record)?;
        self.kv.put(key, raw)?;
        Ok(())
    }

    /// Missing index keys read as empty.
    fn read_index(&self, index_key: &str) -> RepoResult<Vec<String>> {
        match self.kv.get(index_key)? {
            Some(raw) => decode_index(index_key, &raw),
            None => Ok(Vec::new()),
        }
    }

    /// Resolves index IDs to records, skipping IDs with no record.
    fn resolve_index<T: DeserializeOwned>(
        &self,
        index_key: &str,
        kind: EntityKind,
        record_key: fn(&str) -> String,
    ) -> RepoResult<Vec<T>> {
        let ids = self.read_index(index_key)?;
        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.get_record(&record_key(id))? {
                Some(record) => records.push(record),
                None => warn!(
                    "event=index_skip_missing module=repo status=skip index_key={} kind={} entity_id={}",
                    index_key, kind, id
                ),
            }
        }
        Ok(records)
    }

    fn append_to_index(&self, index_key: &str, id: &str) -> RepoResult<()> {
        let slot = self.locks.slot(index_key);
        let _guard = hold(&slot);
        self.rewrite_index(index_key, "append", id, |ids| append_id(ids, id))
    }

    fn remove_from_index(&self, index_key: &str, id: &str) -> RepoResult<()> {
        let slot = self.locks.slot(index_key);
        let _guard = hold(&slot);
        self.rewrite_index(index_key, "remove", id, |ids| {
            let before = ids.len();
            ids.retain(|existing| existing != id);
            ids.len() != before
        })
    }

    /// Read-modify-write of one index. The caller holds the index's slot.
    ///
    /// `mutate` returns whether it changed the sequence; unchanged indexes
    /// are not written back.
    fn rewrite_index(
        &self,
        index_key: &str,
        op: &'static str,
        id: &str,
        mutate: impl FnOnce(&mut Vec<String>) -> bool,
    ) -> RepoResult<()> {
        let result = self.read_index(index_key).and_then(|mut ids| {
            if !mutate(&mut ids) {
                return Ok(());
            }
            let raw = encode_index(index_key, &ids)?;
            self.kv.put(index_key, raw)?;
            Ok(())
        });
        if let Err(err) = &result {
            error!(
                "event=index_write_failed module=repo status=error op={} index_key={} entity_id={} error={}",
                op, index_key, id, err
            );
        }
        result
    }
}

/// Appends `id` unless already present; returns whether `ids` changed.
fn append_id(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.push(id.to_string());
    true
}

/// Result of `EntityStore::audit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub projects_checked: usize,
    pub todos_checked: usize,
    /// Project index entries with no project record.
    pub dangling_project_ids: Vec<ProjectId>,
    /// Todo index entries with no todo record.
    pub dangling_todos: Vec<DanglingTodo>,
    /// Todos listed under a project other than their `projectId`.
    pub misfiled_todos: Vec<MisfiledTodo>,
    /// `(index_key, id)` pairs that appear more than once in one index.
    pub duplicate_entries: Vec<(String, String)>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.dangling_project_ids.is_empty()
            && self.dangling_todos.is_empty()
            && self.misfiled_todos.is_empty()
            && self.duplicate_entries.is_empty()
    }

    fn collect_duplicates(&mut self, index_key: &str, ids: &[String]) {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.as_str()) {
                self.duplicate_entries
                    .push((index_key.to_string(), id.clone()));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingTodo {
    pub project_id: ProjectId,
    pub todo_id: TodoId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MisfiledTodo {
    pub todo_id: TodoId,
    pub listed_under: ProjectId,
    pub project_id: ProjectId,
}
