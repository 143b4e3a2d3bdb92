//! # swipedo
//!
//! A terminal to-do list. Tasks live in one ordered list; rows in the
//! interactive UI are dragged left with the mouse (or opened with `←`) to
//! reveal a Delete action.
//!
//! ## Usage
//!
//! ```bash
//! swipedo            # interactive UI
//! swipedo add "Buy milk"
//! swipedo list
//! swipedo toggle <ID>
//! swipedo move <ID> 0
//! swipedo remove <ID>
//! ```
//!
//! #### UI Key Bindings
//! *   `a`: Add a task
//! *   `Space`: Toggle done
//! *   `←` / `→`: Swipe the selected row open / closed
//! *   `Enter`: Delete the selected row when it is open
//! *   `d`: Delete the selected task
//! *   `J` / `K` (or `Shift+↓` / `Shift+↑`): Move the selected task
//! *   `q`: Quit
//!
//! ## Data Storage
//!
//! The list is saved as JSON under the local data directory
//! (`~/.local/share/swipedo/TODO_TASKS.json` on Linux). Set
//! `SWIPEDO_DATA_DIR` or pass `--data-dir` to use another directory, and
//! `SWIPEDO_LOG` to change the log level of `<data dir>/logs`.

use std::io;
use std::path::PathBuf;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use swipedo::commands::*;
use swipedo::config::Config;
use swipedo::logging::init_logging;
use swipedo::tui::run_tui;

#[derive(Parser)]
#[command(name = "swipedo")]
#[command(about = "Terminal to-do list with swipeable rows", long_about = None)]
struct Cli {
    /// Directory holding the task list and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task to the top of the list
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
    },
    /// List tasks in order
    List,
    /// Mark a task done, or not done again
    Toggle {
        id: String,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Move a task to a 0-based position
    Move {
        id: String,
        position: usize,
    },
    /// Delete all tasks
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "swipedo", &mut io::stdout());
        return;
    }

    let config = Config::from_env().with_data_dir(cli.data_dir.as_deref());
    if let Err(e) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("Logging disabled: {}", e);
    }

    let mut controller = match open_controller(&config) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Cannot open task storage: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Add { title }) => {
            cmd_add(&mut controller, &title, false);
        }
        Some(Commands::List) => cmd_list(&controller),
        Some(Commands::Toggle { id }) => {
            cmd_toggle(&mut controller, &id, false);
        }
        Some(Commands::Remove { id }) => {
            cmd_remove(&mut controller, &id, false);
        }
        Some(Commands::Move { id, position }) => {
            cmd_move(&mut controller, &id, position, false);
        }
        Some(Commands::Reset { force }) => cmd_reset(&mut controller, force),
        Some(Commands::Completions { .. }) => {}
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(controller) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}
