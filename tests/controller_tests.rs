use pretty_assertions::assert_eq;
use serde_json::Value;
use swipedo::controller::TaskController;
use swipedo::storage::{FileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

const KEY: &str = "TODO_TASKS";

fn titles<S: KeyValueStore>(controller: &TaskController<S>) -> Vec<String> {
    controller.tasks().iter().map(|t| t.title.clone()).collect()
}

fn stored(store: &MemoryStore) -> Value {
    let text = store.get_string(KEY).expect("list should be stored");
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_add_trims_and_persists() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);

    let task = controller.add("  Buy milk  ").unwrap().clone();
    assert_eq!(task.title, "Buy milk");
    assert!(!task.is_completed);
    assert_eq!(task.completed_at, None);

    let blob = stored(&store);
    assert_eq!(blob[0]["title"], "Buy milk");
    assert_eq!(blob[0]["isCompleted"], false);
    assert_eq!(blob[0]["id"], task.id.as_str());
    assert!(blob[0]["createdAt"].is_string());
}

#[test]
fn test_whitespace_title_is_rejected_without_a_write() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);
    assert!(controller.add("   ").is_none());
    assert!(controller.add("").is_none());
    assert!(controller.is_empty());
    assert_eq!(store.writes(), 0);
    assert_eq!(store.get_string(KEY), None);
}

#[test]
fn test_new_tasks_go_first_and_reorder_persists() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);
    controller.add("A");
    controller.add("B");
    assert_eq!(titles(&controller), ["B", "A"]);

    let mut reversed = controller.tasks().to_vec();
    reversed.reverse();
    controller.reorder(reversed);
    assert_eq!(titles(&controller), ["A", "B"]);

    let blob = stored(&store);
    assert_eq!(blob[0]["title"], "A");
    assert_eq!(blob[1]["title"], "B");
}

#[test]
fn test_toggle_stamps_and_clears_completion() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);
    let id = controller.add("Read").unwrap().id.clone();

    let done = controller.toggle(&id).unwrap().clone();
    assert!(done.is_completed);
    let completed_at = done.completed_at.expect("completion time");
    assert!(completed_at >= done.created_at);
    assert_eq!(stored(&store)[0]["isCompleted"], true);

    let undone = controller.toggle(&id).unwrap();
    assert!(!undone.is_completed);
    assert_eq!(undone.completed_at, None);
    assert_eq!(stored(&store)[0]["completedAt"], Value::Null);

    assert!(controller.toggle("missing").is_none());
}

#[test]
fn test_delete_removes_only_the_target() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);
    let keep = controller.add("keep").unwrap().id.clone();
    let drop = controller.add("drop").unwrap().id.clone();

    let removed = controller.delete(&drop).unwrap();
    assert_eq!(removed.title, "drop");
    assert_eq!(titles(&controller), ["keep"]);
    assert_eq!(stored(&store)[0]["id"], keep.as_str());
    assert!(controller.delete(&drop).is_none());
}

#[test]
fn test_load_reads_stored_list() {
    let mut store = MemoryStore::new();
    let blob = r#"[
        {"id":"2","title":"Second","isCompleted":true,
         "createdAt":"2025-01-02T08:00:00.000Z","completedAt":"2025-01-03T09:30:00.000Z"},
        {"id":"1","title":"First","isCompleted":false,"createdAt":"2025-01-01T08:00:00.000Z"}
    ]"#;
    store.set(KEY, blob.as_bytes()).unwrap();

    let controller = TaskController::load(store, KEY);
    assert_eq!(titles(&controller), ["Second", "First"]);
    assert!(controller.get("2").unwrap().completed_at.is_some());
    assert_eq!(controller.get("1").unwrap().completed_at, None);
}

#[test]
fn test_malformed_blob_loads_as_empty_list() {
    let mut store = MemoryStore::new();
    store.set(KEY, b"{not json").unwrap();
    let controller = TaskController::load(store.clone(), KEY);
    assert!(controller.is_empty());
    // Nothing is overwritten until the next mutation.
    assert_eq!(store.get_string(KEY).as_deref(), Some("{not json"));
}

#[test]
fn test_failed_save_keeps_memory_authoritative() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);
    controller.add("saved");

    store.fail_writes(true);
    controller.add("unsaved");
    assert!(!controller.last_save_ok());
    assert_eq!(titles(&controller), ["unsaved", "saved"]);
    assert_eq!(stored(&store).as_array().unwrap().len(), 1);

    store.fail_writes(false);
    let id = controller.tasks()[0].id.clone();
    controller.toggle(&id);
    assert!(controller.last_save_ok());
    assert_eq!(stored(&store).as_array().unwrap().len(), 2);
}

#[test]
fn test_file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let mut controller = TaskController::new(store, KEY);
    controller.add("A");
    controller.add("B");
    let b = controller.tasks()[0].id.clone();
    controller.toggle(&b);
    assert!(dir.path().join("TODO_TASKS.json").exists());

    let reloaded = TaskController::load(FileStore::open(dir.path()).unwrap(), KEY);
    assert_eq!(reloaded.tasks(), controller.tasks());
}

#[test]
fn test_clear_removes_the_stored_list() {
    let store = MemoryStore::new();
    let mut controller = TaskController::new(store.clone(), KEY);
    controller.add("A");
    controller.clear().unwrap();
    assert!(controller.is_empty());
    assert_eq!(store.get_string(KEY), None);
}
