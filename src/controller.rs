use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::models::Task;
use crate::storage::{KeyValueStore, StorageError};

/// Owns the ordered task list and mirrors every mutation to a key-value store
/// as a full-list overwrite.
///
/// Storage failures never propagate out of the mutating methods: they are
/// logged, `last_save_ok` turns false, and the in-memory list stays
/// authoritative until the next successful save.
pub struct TaskController<S: KeyValueStore> {
    store: S,
    key: String,
    tasks: Vec<Task>,
    last_id: i64,
    last_save_ok: bool,
}

impl<S: KeyValueStore> TaskController<S> {
    /// Creates a controller with an empty list. Nothing is read or written.
    pub fn new(store: S, key: impl Into<String>) -> TaskController<S> {
        TaskController {
            store,
            key: key.into(),
            tasks: Vec::new(),
            last_id: 0,
            last_save_ok: true,
        }
    }

    /// Creates a controller seeded from the blob stored under `key`.
    ///
    /// An absent key yields an empty list. An unreadable or malformed blob
    /// also yields an empty list and is logged.
    pub fn load(store: S, key: impl Into<String>) -> TaskController<S> {
        let mut controller = TaskController::new(store, key);
        controller.tasks = match controller.read_tasks() {
            Ok(Some(tasks)) => {
                info!(
                    "event=tasks_loaded module=controller status=ok key={} count={}",
                    controller.key,
                    tasks.len()
                );
                tasks
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(
                    "event=tasks_loaded module=controller status=error key={} error={}",
                    controller.key, e
                );
                Vec::new()
            }
        };
        controller.last_id = controller
            .tasks
            .iter()
            .filter_map(|t| t.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        controller
    }

    fn read_tasks(&self) -> Result<Option<Vec<Task>>, LoadError> {
        let Some(bytes) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the most recent save attempt succeeded.
    pub fn last_save_ok(&self) -> bool {
        self.last_save_ok
    }

    /// Prepends a new task titled with the trimmed `title`.
    ///
    /// Returns `None` without touching the list or the store when the
    /// trimmed title is empty.
    pub fn add(&mut self, title: &str) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            debug!("event=task_add module=controller status=rejected reason=empty_title");
            return None;
        }
        let now = Utc::now();
        let id = self.next_id(now);
        self.tasks.insert(0, Task::new(id, title, now));
        self.save();
        self.tasks.first()
    }

    /// Flips completion of the task with `id`.
    pub fn toggle(&mut self, id: &str) -> Option<&Task> {
        let index = self.position(id)?;
        self.tasks[index].toggle(Utc::now());
        self.save();
        self.tasks.get(index)
    }

    /// Removes the task with `id` and returns it.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        self.save();
        Some(removed)
    }

    /// Replaces the list with `tasks`, as delivered by a drag-reorder widget
    /// on drop.
    pub fn reorder(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.save();
    }

    /// Moves the task with `id` to `to_index`, clamped to the last position.
    ///
    /// Returns false when `id` is unknown. Moving a task onto its own
    /// position saves nothing.
    pub fn move_task(&mut self, id: &str, to_index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let to = to_index.min(self.tasks.len() - 1);
        if from == to {
            return true;
        }
        let mut reordered = self.tasks.clone();
        let task = reordered.remove(from);
        reordered.insert(to, task);
        self.reorder(reordered);
        true
    }

    /// Drops every task and removes the stored blob.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.tasks.clear();
        self.store.remove(&self.key)
    }

    /// Millisecond timestamp id, bumped past the previous one when two
    /// tasks land in the same millisecond.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    fn save(&mut self) {
        let result = serde_json::to_vec(&self.tasks)
            .map_err(StorageError::from)
            .and_then(|bytes| self.store.set(&self.key, &bytes));
        match result {
            Ok(()) => {
                self.last_save_ok = true;
                debug!(
                    "event=tasks_saved module=controller status=ok key={} count={}",
                    self.key,
                    self.tasks.len()
                );
            }
            Err(e) => {
                self.last_save_ok = false;
                error!(
                    "event=tasks_saved module=controller status=error key={} error={}",
                    self.key, e
                );
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("malformed task list: {0}")]
    Malformed(#[from] serde_json::Error),
}
