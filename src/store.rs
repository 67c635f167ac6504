// Task store: ordered task list mirrored to a JSON file

use crate::error::{Result, StoreError};
use crate::filter::{self, Filter, TaskRow};
use crate::json;
use crate::task::Task;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default task file name, relative to the working directory
pub const DEFAULT_TASKS_FILE: &str = "tasks.json";

/// What to do when the task file exists but cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Return [`StoreError::StorageCorrupt`] from `open`
    #[default]
    Fail,
    /// Move the file aside to an unused `<file>.corrupt[.N]` and start with an empty list
    StartEmpty,
}

/// Authoritative task collection with a durable copy on disk
///
/// Every mutating operation rewrites the whole file before returning, so the
/// file and the in-memory list never differ once a call completes; a failed
/// write leaves the list as it was. The store holds an exclusive lock on
/// `<file>.lock` for as long as it is open. The lock file is left in place on
/// drop; use [`read_snapshot`] to read the tasks without taking the lock.
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    _lock: File,
}

impl TaskStore {
    /// Open the task file at `path`, failing if it is corrupt
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, CorruptPolicy::Fail)
    }

    /// Open the task file at `path`
    ///
    /// A missing file yields an empty store; nothing is written until the first mutation.
    pub fn open_with<P: AsRef<Path>>(path: P, policy: CorruptPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock = Self::acquire_lock(&path)?;

        let tasks = match json::read_tasks(&path) {
            Ok(Some(tasks)) => tasks,
            Ok(None) => {
                info!(file = ?path, "No task file yet, starting empty");
                Vec::new()
            }
            Err(StoreError::StorageCorrupt { path, source }) if policy == CorruptPolicy::StartEmpty => {
                let backup = Self::backup_path(&path);
                warn!(
                    file = ?path,
                    backup = ?backup,
                    error = %source,
                    "Task file is corrupt, moving it aside and starting empty"
                );
                fs::rename(&path, &backup).map_err(|e| StoreError::unavailable(&path, e))?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            tasks,
            _lock: lock,
        })
    }

    /// First of `<file>.corrupt`, `<file>.corrupt.1`, ... that does not exist yet
    fn backup_path(path: &Path) -> PathBuf {
        let first = json::sibling(path, "corrupt");
        if !first.exists() {
            return first;
        }
        (1..)
            .map(|n| json::sibling(path, &format!("corrupt.{}", n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(parent, e))?;
        }

        let lock_path = json::sibling(path, "lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::unavailable(&lock_path, e))?;

        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                StoreError::StoreLocked {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::unavailable(&lock_path, e)
            }
        })?;

        Ok(file)
    }

    /// Path of the durable task file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks in collection order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Append a pending task
    ///
    /// The title is stored as given. A blank title is rejected with
    /// [`StoreError::EmptyInput`] and nothing is written.
    pub fn add(&mut self, title: &str) -> Result<()> {
        Self::validate_title(title)?;
        debug!(title, "add");

        let mut tasks = self.tasks.clone();
        tasks.push(Task::new(title));
        self.commit(tasks)
    }

    /// Delete the task at `position`; later tasks move up one position
    pub fn remove(&mut self, position: usize) -> Result<Task> {
        let index = self.index_of(position)?;
        debug!(position, "remove");

        let mut tasks = self.tasks.clone();
        let removed = tasks.remove(index);
        self.commit(tasks)?;
        Ok(removed)
    }

    /// Mark the task at `position` as completed
    ///
    /// Completing a task that is already done is a no-op, but the file is still rewritten.
    pub fn complete(&mut self, position: usize) -> Result<()> {
        let index = self.index_of(position)?;
        debug!(position, "complete");

        let mut tasks = self.tasks.clone();
        tasks[index].completed = true;
        self.commit(tasks)
    }

    /// Replace the title of the task at `position`
    ///
    /// The position is checked first. A blank `new_title` then skips the
    /// edit entirely with [`StoreError::EmptyInput`]: no mutation, no write.
    pub fn edit(&mut self, position: usize, new_title: &str) -> Result<()> {
        let index = self.index_of(position)?;
        Self::validate_title(new_title)?;
        debug!(position, new_title, "edit");

        let mut tasks = self.tasks.clone();
        tasks[index].title = new_title.to_string();
        self.commit(tasks)
    }

    /// Rows matching `filter`, numbered by their position in the full list
    pub fn list(&self, filter: Filter) -> Vec<TaskRow> {
        filter::apply(&self.tasks, filter)
    }

    /// The task at `position`
    pub fn get(&self, position: usize) -> Result<&Task> {
        let index = self.index_of(position)?;
        Ok(&self.tasks[index])
    }

    /// Check a caller's selection against the current list
    ///
    /// `None` means nothing was selected.
    pub fn resolve_selection(&self, selection: Option<usize>) -> Result<usize> {
        let position = selection.ok_or(StoreError::NoSelection)?;
        self.index_of(position)?;
        Ok(position)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn index_of(&self, position: usize) -> Result<usize> {
        if position == 0 || position > self.tasks.len() {
            return Err(StoreError::InvalidPosition {
                position,
                len: self.tasks.len(),
            });
        }
        Ok(position - 1)
    }

    fn validate_title(title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyInput);
        }
        Ok(())
    }

    /// Write `tasks` to disk, then make them the current list
    fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        json::write_tasks(&self.path, &tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}

/// Read the current task list without opening a store
///
/// Takes no lock, so it works while another process has the store open.
/// Writes replace the file by rename, so the result is always a complete list.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<Task>> {
    Ok(json::read_tasks(path.as_ref())?.unwrap_or_default())
}
