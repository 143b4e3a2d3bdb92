use std::io::{self, Write};
use chrono::{DateTime, Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crate::config::Config;
use crate::controller::TaskController;
use crate::models::Task;
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Opens the on-disk store described by `config` and loads the task list.
pub fn open_controller(config: &Config) -> Result<TaskController<FileStore>, StorageError> {
    let store = FileStore::open(&config.data_dir)?;
    Ok(TaskController::load(store, config.storage_key.clone()))
}

/// Formats a timestamp as `M/d HH:mm` in local time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-m/%-d %H:%M").to_string()
}

/// One-line summary of when a task was added and, if done, completed.
pub fn describe_dates(task: &Task) -> String {
    match (task.is_completed, task.completed_at) {
        (true, Some(done)) => format!(
            "done {} / added {}",
            format_timestamp(done),
            format_timestamp(task.created_at)
        ),
        _ => format!("added {}", format_timestamp(task.created_at)),
    }
}

fn report_save<S: KeyValueStore>(controller: &TaskController<S>, silent: bool) {
    if !controller.last_save_ok() && !silent {
        eprintln!("Warning: changes could not be saved; they will be lost on exit.");
    }
}

/// Adds a task to the top of the list.
///
/// Returns the new task's id, or `None` when the title is blank.
pub fn cmd_add<S: KeyValueStore>(
    controller: &mut TaskController<S>,
    title: &str,
    silent: bool,
) -> Option<String> {
    let id = match controller.add(title) {
        Some(task) => task.id.clone(),
        None => {
            if !silent { eprintln!("Task title cannot be empty."); }
            return None;
        }
    };
    if !silent { println!("Task added (id = {})", id); }
    report_save(controller, silent);
    Some(id)
}

/// Flips completion of a task by id.
pub fn cmd_toggle<S: KeyValueStore>(
    controller: &mut TaskController<S>,
    id: &str,
    silent: bool,
) -> bool {
    match controller.toggle(id) {
        Some(task) => {
            if !silent {
                let state = if task.is_completed { "complete" } else { "incomplete" };
                println!("Task {} marked as {}.", id, state);
            }
        }
        None => {
            if !silent { eprintln!("Task {} not found.", id); }
            return false;
        }
    }
    report_save(controller, silent);
    true
}

/// Removes a task by id.
pub fn cmd_remove<S: KeyValueStore>(
    controller: &mut TaskController<S>,
    id: &str,
    silent: bool,
) -> bool {
    if controller.delete(id).is_none() {
        if !silent { eprintln!("Task {} not found.", id); }
        return false;
    }
    if !silent { println!("Task {} removed.", id); }
    report_save(controller, silent);
    true
}

/// Moves a task to a 0-based position in the list.
pub fn cmd_move<S: KeyValueStore>(
    controller: &mut TaskController<S>,
    id: &str,
    position: usize,
    silent: bool,
) -> bool {
    if !controller.move_task(id, position) {
        if !silent { eprintln!("Task {} not found.", id); }
        return false;
    }
    if !silent {
        let at = controller.position(id).unwrap_or(position);
        println!("Task {} moved to position {}.", id, at);
    }
    report_save(controller, silent);
    true
}

/// Lists tasks in a formatted table, in list order.
pub fn cmd_list<S: KeyValueStore>(controller: &TaskController<S>) {
    if controller.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Dates").add_attribute(Attribute::Bold),
        ]);

    for (i, t) in controller.tasks().iter().enumerate() {
        let (status, status_color) = if t.is_completed {
            ("Done", Color::Green)
        } else {
            ("Pending", Color::Yellow)
        };
        let title = if t.is_completed {
            Cell::new(&t.title).fg(Color::Grey)
        } else {
            Cell::new(&t.title)
        };

        table.add_row(vec![
            Cell::new(i),
            Cell::new(&t.id),
            title,
            Cell::new(status).fg(status_color),
            Cell::new(describe_dates(t)),
        ]);
    }

    println!("{table}");
}

/// Deletes every task after confirmation.
pub fn cmd_reset<S: KeyValueStore>(controller: &mut TaskController<S>, force: bool) {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        let mut input = String::new();
        let answered = io::stdout()
            .flush()
            .and_then(|_| io::stdin().read_line(&mut input));
        if let Err(e) = answered {
            eprintln!("Failed to read confirmation: {}", e);
            return;
        }
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = controller.clear() {
        eprintln!("Failed to reset task list: {}", e);
    } else {
        println!("Task list reset successfully.");
    }
}
