use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::NamedTempFile;

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed byte store. Values are opaque to the store.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    /// Removes every key.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go through a temp file in the same directory and are renamed into
/// place, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<FileStore, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    pub fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        atomic_write(&path, value).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| StorageError::Io {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: BTreeMap<String, Vec<u8>>,
    writes: usize,
    fail_writes: bool,
}

/// In-process store. Clones share the same contents, so a host can keep a
/// handle for inspection while a controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Makes every subsequent `set` fail until switched back off.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Returns the stored value as UTF-8 text, if present and valid.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.inner
            .borrow()
            .values
            .get(key)
            .and_then(|v| String::from_utf8(v.clone()).ok())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.inner.borrow().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StorageError::Unavailable(format!("write to {key} rejected")));
        }
        inner.values.insert(key.to_string(), value.to_vec());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.borrow_mut().values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.inner.borrow_mut().values.clear();
        Ok(())
    }
}
