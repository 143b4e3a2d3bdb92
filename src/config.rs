use std::path::{Path, PathBuf};

use crate::logging::default_log_level;

/// Key the task list is stored under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "TODO_TASKS";

pub const DATA_DIR_ENV: &str = "SWIPEDO_DATA_DIR";
pub const STORAGE_KEY_ENV: &str = "SWIPEDO_STORAGE_KEY";
pub const LOG_LEVEL_ENV: &str = "SWIPEDO_LOG";

/// Runtime settings shared by the CLI and the TUI.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the store files and logs.
    pub data_dir: PathBuf,
    /// Key the task list blob lives under.
    pub storage_key: String,
    pub log_level: String,
}

impl Config {
    /// Resolves the configuration from the process environment.
    ///
    /// The data directory is determined in the following order:
    /// 1. `SWIPEDO_DATA_DIR` environment variable.
    /// 2. `~/.local/share/swipedo` (on Linux).
    /// 3. `./swipedo` (fallback).
    pub fn from_env() -> Config {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty(DATA_DIR_ENV).map(PathBuf::from).unwrap_or_else(|| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("swipedo");
            p
        });
        let storage_key = non_empty(STORAGE_KEY_ENV)
            .map(|k| k.trim().to_string())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let log_level = non_empty(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string());

        Config {
            data_dir,
            storage_key,
            log_level,
        }
    }

    /// Replaces the data directory, e.g. from a `--data-dir` flag.
    pub fn with_data_dir(mut self, dir: Option<&Path>) -> Config {
        if let Some(dir) = dir {
            self.data_dir = dir.to_path_buf();
        }
        self
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
