//! Task list with swipe-to-reveal rows.
//!
//! [`controller::TaskController`] keeps the ordered task list and writes it
//! through a [`storage::KeyValueStore`] after every change. [`swipe`] holds
//! the row gesture machinery used by the terminal UI in [`tui`].

pub mod commands;
pub mod config;
pub mod controller;
pub mod logging;
pub mod models;
pub mod storage;
pub mod swipe;
pub mod tui;
