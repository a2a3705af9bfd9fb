// SPDX-License-Identifier: MIT
//! In-memory task registry.
//!
//! The store is the single authority for task records: it allocates ids,
//! stamps creation times, and owns every `Task` instance. Handlers only ever
//! see clones. All operations serialize through one mutex, held only for the
//! duration of a single map access.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// Errors originating in the store. Only `NotFound` exists today; the enum is
/// non-exhaustive so callers keep a catch-all arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(i64),
}

struct Inner {
    tasks: BTreeMap<i64, Task>,
    next_id: i64,
}

/// Concurrency-safe in-memory task registry.
///
/// Ids start at 1, increase by one per create, and are never reused: a
/// deleted id stays invalid for the lifetime of the process.
pub struct TaskStore {
    inner: Mutex<Inner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tasks: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Insert a new task with the given title and return a copy of it.
    pub fn create(&self, title: impl Into<String>) -> Task {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        let task = Task {
            id,
            title: title.into(),
            done: false,
            created_at: Utc::now(),
        };
        inner.tasks.insert(id, task.clone());
        task
    }

    pub fn get(&self, id: i64) -> Result<Task, StoreError> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// All tasks in insertion (id) order.
    pub fn list(&self) -> Vec<Task> {
        self.inner.lock().unwrap().tasks.values().cloned().collect()
    }

    /// Set the `done` flag of an existing task and return the updated copy.
    pub fn update_done(&self, id: i64, done: bool) -> Result<Task, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner.tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        task.done = done;
        Ok(task.clone())
    }

    /// Remove a task permanently.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn create_assigns_sequential_ids_from_one() {
        let store = TaskStore::new();
        assert_eq!(store.create("first task").id, 1);
        assert_eq!(store.create("second task").id, 2);
        assert_eq!(store.create("third task").id, 3);
    }

    #[test]
    fn create_defaults_done_to_false() {
        let store = TaskStore::new();
        let task = store.create("new task");
        assert!(!task.done);
        assert_eq!(task.title, "new task");
    }

    #[test]
    fn get_missing_id_is_not_found() {
        let store = TaskStore::new();
        assert!(matches!(store.get(42), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn delete_is_terminal_and_ids_are_never_reused() {
        let store = TaskStore::new();
        let id = store.create("doomed").id;
        store.delete(id).unwrap();

        assert!(matches!(store.get(id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(id), Err(StoreError::NotFound(_))));

        // The freed id must not be handed out again.
        let next = store.create("successor");
        assert!(next.id > id);
    }

    #[test]
    fn update_done_changes_only_the_done_flag() {
        let store = TaskStore::new();
        let created = store.create("stable task");

        let updated = store.update_done(created.id, true).unwrap();
        assert!(updated.done);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.created_at, created.created_at);

        let reverted = store.update_done(created.id, false).unwrap();
        assert!(!reverted.done);
    }

    #[test]
    fn update_done_missing_id_is_not_found() {
        let store = TaskStore::new();
        assert!(matches!(
            store.update_done(7, true),
            Err(StoreError::NotFound(7))
        ));
    }

    #[test]
    fn list_returns_tasks_in_insertion_order() {
        let store = TaskStore::new();
        for title in ["aaa", "bbb", "ccc"] {
            store.create(title);
        }
        store.delete(2).unwrap();

        let titles: Vec<_> = store.list().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["aaa", "ccc"]);
    }

    #[test]
    fn concurrent_creates_get_distinct_increasing_ids() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 50;

        let store = Arc::new(TaskStore::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| store.create(format!("task {t}-{i}")).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let ids = handle.join().unwrap();
            // Ids handed to a single thread are strictly increasing.
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            for id in ids {
                assert!(seen.insert(id), "id {id} handed out twice");
            }
        }
        assert_eq!(seen.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let store = TaskStore::new();
        let task = store.create("wire shape");

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["title"], "wire shape");
        assert_eq!(value["done"], false);
        assert!(value["createdAt"].is_string());
        assert!(value.get("created_at").is_none());
    }
}
