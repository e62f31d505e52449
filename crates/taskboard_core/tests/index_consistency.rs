use std::sync::{Arc, Mutex};
use std::thread;
use taskboard_core::repo::keys::{project_key, project_todos_key, todo_key, PROJECT_INDEX_KEY};
use taskboard_core::{
    EntityKind, EntityStore, KvError, KvResult, KvStore, MemoryKvStore, RepoError, StatusFilter,
};

/// Memory store that fails writes to keys matching an armed rule.
#[derive(Default)]
struct FaultyKvStore {
    inner: MemoryKvStore,
    fail_put: Mutex<Option<fn(&str) -> bool>>,
    fail_delete: Mutex<Option<fn(&str) -> bool>>,
}

impl FaultyKvStore {
    fn fail_puts(&self, rule: fn(&str) -> bool) {
        *self.fail_put.lock().unwrap() = Some(rule);
    }

    fn fail_deletes(&self, rule: fn(&str) -> bool) {
        *self.fail_delete.lock().unwrap() = Some(rule);
    }

    fn heal(&self) {
        *self.fail_put.lock().unwrap() = None;
        *self.fail_delete.lock().unwrap() = None;
    }
}

impl KvStore for FaultyKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: String) -> KvResult<()> {
        if let Some(rule) = *self.fail_put.lock().unwrap() {
            if rule(key) {
                return Err(KvError::Backend(format!("injected put failure on {key}")));
            }
        }
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        if let Some(rule) = *self.fail_delete.lock().unwrap() {
            if rule(key) {
                return Err(KvError::Backend(format!("injected delete failure on {key}")));
            }
        }
        self.inner.delete(key)
    }
}

fn setup() -> (Arc<FaultyKvStore>, EntityStore<Arc<FaultyKvStore>>) {
    let kv = Arc::new(FaultyKvStore::default());
    let store = EntityStore::new(Arc::clone(&kv));
    (kv, store)
}

#[test]
fn failed_project_index_append_leaves_record_reachable_only_by_id() {
    let (kv, store) = setup();
    let listed = store.create_project("Listed", None).unwrap();

    kv.fail_puts(|key| key == PROJECT_INDEX_KEY);
    let err = store.create_project("Hidden", None).unwrap_err();
    assert!(matches!(err, RepoError::Kv(KvError::Backend(_))));
    assert!(err.is_store_failure());
    kv.heal();

    let projects = store.list_projects().unwrap();
    assert_eq!(projects, vec![listed.clone()]);

    let listed_key = project_key(&listed.id);
    let hidden_id = kv
        .inner
        .keys()
        .into_iter()
        .filter(|key| key.starts_with("project:") && !key.ends_with(":todos"))
        .find(|key| *key != listed_key)
        .and_then(|key| key.strip_prefix("project:").map(str::to_string))
        .unwrap();

    let hidden = store.get_project(&hidden_id).unwrap();
    assert_eq!(hidden.project.name, "Hidden");
    assert!(hidden.todos.is_empty());
    assert!(store
        .list_projects()
        .unwrap()
        .iter()
        .all(|project| project.id != hidden_id));
}

#[test]
fn failed_todo_record_write_leaves_index_untouched() {
    let (kv, store) = setup();
    let project = store.create_project("Launch", None).unwrap();

    kv.fail_puts(|key| key.starts_with("todo:"));
    assert!(store.create_todo(&project.id, "x", None, None).is_err());
    kv.heal();

    assert!(!kv.inner.contains_key(&project_todos_key(&project.id)));
    assert!(store.audit().unwrap().is_consistent());
}

#[test]
fn interrupted_project_delete_leaves_only_dangling_index_entry() {
    let (kv, store) = setup();
    let project = store.create_project("Launch", None).unwrap();
    let todo = store.create_todo(&project.id, "a", None, None).unwrap();

    kv.fail_puts(|key| key == PROJECT_INDEX_KEY);
    assert!(store.delete_project(&project.id).is_err());
    kv.heal();

    assert!(!kv.inner.contains_key(&todo_key(&todo.id)));
    assert!(!kv.inner.contains_key(&project_key(&project.id)));
    assert!(store.list_projects().unwrap().is_empty());

    let report = store.audit().unwrap();
    assert_eq!(report.dangling_project_ids, vec![project.id.clone()]);
    assert!(report.dangling_todos.is_empty());
}

#[test]
fn interrupted_todo_delete_keeps_record_addressable() {
    let (kv, store) = setup();
    let project = store.create_project("Launch", None).unwrap();
    let todo = store.create_todo(&project.id, "a", None, None).unwrap();

    kv.fail_deletes(|key| key.starts_with("todo:"));
    assert!(store.delete_todo(&todo.id).is_err());
    kv.heal();

    assert!(store
        .list_todos(&project.id, StatusFilter::All)
        .unwrap()
        .is_empty());
    assert_eq!(store.get_todo(&todo.id).unwrap(), todo);

    store.delete_todo(&todo.id).unwrap();
    assert!(store.get_todo(&todo.id).unwrap_err().is_not_found());
}

#[test]
fn malformed_record_is_store_failure() {
    let (kv, store) = setup();
    let project = store.create_project("Launch", None).unwrap();
    kv.inner
        .put(&project_key(&project.id), "{not json".to_string())
        .unwrap();

    let err = store.get_project(&project.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData { ref key, .. } if *key == project_key(&project.id)));
    assert!(store.list_projects().unwrap_err().is_store_failure());
}

#[test]
fn audit_reports_dangling_misfiled_and_duplicate_entries() {
    let (kv, store) = setup();
    let a = store.create_project("A", None).unwrap();
    let b = store.create_project("B", None).unwrap();
    let ta = store.create_todo(&a.id, "ta", None, None).unwrap();
    let tb = store.create_todo(&b.id, "tb", None, None).unwrap();
    let gone = store.create_todo(&a.id, "gone", None, None).unwrap();

    kv.inner.delete(&todo_key(&gone.id)).unwrap();
    let index = serde_json::to_string(&vec![ta.id.clone(), tb.id.clone(), ta.id.clone()]).unwrap();
    kv.inner.put(&project_todos_key(&a.id), index).unwrap();

    let report = store.audit().unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.projects_checked, 2);
    assert!(report.dangling_todos.is_empty());
    assert_eq!(report.misfiled_todos.len(), 1);
    assert_eq!(report.misfiled_todos[0].todo_id, tb.id);
    assert_eq!(report.misfiled_todos[0].listed_under, a.id);
    assert_eq!(report.misfiled_todos[0].project_id, b.id);
    assert_eq!(
        report.duplicate_entries,
        vec![(project_todos_key(&a.id), ta.id.clone())]
    );

    let index = serde_json::to_string(&vec![gone.id.clone()]).unwrap();
    kv.inner.put(&project_todos_key(&a.id), index).unwrap();
    let report = store.audit().unwrap();
    assert_eq!(report.dangling_todos.len(), 1);
    assert_eq!(report.dangling_todos[0].todo_id, gone.id);
}

#[test]
fn concurrent_creators_do_not_lose_index_appends() {
    let store = Arc::new(EntityStore::new(MemoryKvStore::new()));
    let project = store.create_project("Busy", None).unwrap();

    let handles = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            let project_id = project.id.clone();
            thread::spawn(move || {
                for item in 0..25 {
                    store
                        .create_todo(&project_id, format!("w{worker}-{item}"), None, None)
                        .unwrap();
                }
                store
                    .create_project(format!("side-{worker}"), None)
                    .unwrap();
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let todos = store.list_todos(&project.id, StatusFilter::All).unwrap();
    assert_eq!(todos.len(), 200);
    assert_eq!(store.list_projects().unwrap().len(), 9);

    let report = store.audit().unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.todos_checked, 200);
}

#[test]
fn create_todo_racing_project_delete_leaves_no_orphans() {
    for _ in 0..20 {
        let (kv, store) = setup();
        let store = Arc::new(store);
        let project = store.create_project("Doomed", None).unwrap();

        let creators = (0..4)
            .map(|worker| {
                let store = Arc::clone(&store);
                let project_id = project.id.clone();
                thread::spawn(move || {
                    let mut created = 0usize;
                    loop {
                        match store.create_todo(&project_id, format!("w{worker}"), None, None) {
                            Ok(_) => created += 1,
                            Err(RepoError::NotFound { kind, id }) => {
                                assert_eq!(kind, EntityKind::Project);
                                assert_eq!(id, project_id);
                                return created;
                            }
                            Err(err) => panic!("unexpected failure: {err}"),
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        while kv.inner.keys().iter().all(|key| !key.starts_with("todo:")) {
            thread::yield_now();
        }
        store.delete_project(&project.id).unwrap();
        for handle in creators {
            handle.join().unwrap();
        }

        assert!(kv.inner.keys().iter().all(|key| !key.starts_with("todo:")));
        assert!(!kv.inner.contains_key(&project_todos_key(&project.id)));
        assert!(store.audit().unwrap().is_consistent());
    }
}
