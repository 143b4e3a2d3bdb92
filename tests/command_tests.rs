use pretty_assertions::assert_eq;
use swipedo::commands::*;
use swipedo::config::Config;
use swipedo::controller::TaskController;
use swipedo::storage::MemoryStore;
use tempfile::TempDir;

fn memory_controller() -> (TaskController<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    (TaskController::new(store.clone(), "TODO_TASKS"), store)
}

fn test_config(dir: &TempDir) -> Config {
    Config::from_lookup(|_| None).with_data_dir(Some(dir.path()))
}

#[test]
fn test_add_and_list() {
    let (mut controller, _) = memory_controller();
    let first = cmd_add(&mut controller, "Test Task", true).unwrap();
    let second = cmd_add(&mut controller, "Another", true).unwrap();
    assert_ne!(first, second);
    assert_eq!(controller.tasks()[0].id, second);
    assert_eq!(controller.tasks()[1].title, "Test Task");
    cmd_list(&controller);

    assert_eq!(cmd_add(&mut controller, "  ", true), None);
    assert_eq!(controller.len(), 2);
}

#[test]
fn test_toggle_task() {
    let (mut controller, _) = memory_controller();
    let id = cmd_add(&mut controller, "Toggle Me", true).unwrap();
    assert!(cmd_toggle(&mut controller, &id, true));
    assert!(controller.get(&id).unwrap().is_completed);
    assert!(cmd_toggle(&mut controller, &id, true));
    assert!(!controller.get(&id).unwrap().is_completed);
    assert!(!cmd_toggle(&mut controller, "nope", true));
}

#[test]
fn test_remove_task() {
    let (mut controller, store) = memory_controller();
    let id = cmd_add(&mut controller, "Remove Me", true).unwrap();
    assert!(cmd_remove(&mut controller, &id, true));
    assert!(controller.is_empty());
    assert_eq!(store.get_string("TODO_TASKS").as_deref(), Some("[]"));
    assert!(!cmd_remove(&mut controller, &id, true));
}

#[test]
fn test_move_task() {
    let (mut controller, _) = memory_controller();
    let a = cmd_add(&mut controller, "A", true).unwrap();
    cmd_add(&mut controller, "B", true);
    cmd_add(&mut controller, "C", true);

    assert!(cmd_move(&mut controller, &a, 0, true));
    let titles: Vec<&str> = controller.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["A", "C", "B"]);
    assert!(!cmd_move(&mut controller, "nope", 1, true));
}

#[test]
fn test_file_backed_commands_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    assert_eq!(config.storage_key, "TODO_TASKS");

    let mut controller = open_controller(&config).unwrap();
    let id = cmd_add(&mut controller, "Persist me", true).unwrap();
    cmd_toggle(&mut controller, &id, true);
    drop(controller);

    let reopened = open_controller(&config).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(&id).unwrap().is_completed);
}

#[test]
fn test_reset_force_clears_everything() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let mut controller = open_controller(&config).unwrap();
    cmd_add(&mut controller, "One", true);
    cmd_add(&mut controller, "Two", true);

    cmd_reset(&mut controller, true);
    assert!(controller.is_empty());
    assert!(open_controller(&config).unwrap().is_empty());
    assert!(!dir.path().join("TODO_TASKS.json").exists());
}
