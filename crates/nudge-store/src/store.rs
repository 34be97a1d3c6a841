//! Flat-file JSON task store.
//!
//! The whole task list lives in one JSON array and is rewritten on every
//! mutation. There is no locking: two processes mutating the same file can
//! lose each other's updates.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::StoreConfig;
use crate::models::TaskRecord;

/// Errors from reading or mutating the task file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read task file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write task file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task file {path} is not a valid task list: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no task at index {index} (list has {len} tasks)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Handle on a task file. Cheap to construct; every call hits the disk.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::open(config.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty list.
    pub fn load(&self) -> Result<Vec<TaskRecord>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the file with exactly `records`, creating parent dirs as needed.
    pub fn save(&self, records: &[TaskRecord]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        std::fs::write(&self.path, json).map_err(write_err)?;
        debug!(path = %self.path.display(), count = records.len(), "task file saved");
        Ok(())
    }

    /// Append a new pending task and return the updated list.
    pub fn add(&self, title: &str, time: &str) -> Result<Vec<TaskRecord>, StoreError> {
        let mut records = self.load()?;
        records.push(TaskRecord::new(title, time));
        self.save(&records)?;
        Ok(records)
    }

    /// Mark the task at `index` as done.
    pub fn mark_done(&self, index: usize) -> Result<Vec<TaskRecord>, StoreError> {
        self.update(index, |rec| rec.done = true)
    }

    /// Push the task at `index` back once more.
    pub fn postpone(&self, index: usize) -> Result<Vec<TaskRecord>, StoreError> {
        self.update(index, |rec| rec.postponed = rec.postponed.saturating_add(1))
    }

    /// Drop every task.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.save(&[])
    }

    /// Read-modify-write one record. The file is untouched when `index` is
    /// out of range.
    fn update(
        &self,
        index: usize,
        f: impl FnOnce(&mut TaskRecord),
    ) -> Result<Vec<TaskRecord>, StoreError> {
        let mut records = self.load()?;
        let len = records.len();
        let rec = records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        f(rec);
        self.save(&records)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = TaskStore::open(tmp.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn load_blank_file_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(TaskStore::open(&path).load().unwrap().is_empty());
    }

    #[test]
    fn load_garbage_is_malformed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = TaskStore::open(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }), "got: {err}");
    }

    #[test]
    fn save_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dir").join("tasks.json");
        let store = TaskStore::open(&path);
        store.save(&[TaskRecord::new("a", "b")]).unwrap();
        assert!(path.exists());
    }
}
