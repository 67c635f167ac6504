// JSON file operations

use crate::error::{Result, StoreError};
use crate::task::Task;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read the full task list from a JSON file
///
/// Returns `Ok(None)` when the file does not exist yet.
pub fn read_tasks(path: &Path) -> Result<Option<Vec<Task>>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(file = ?path, "Task file not found");
            return Ok(None);
        }
        Err(e) => return Err(StoreError::unavailable(path, e)),
    };

    let tasks: Vec<Task> = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            StoreError::unavailable(path, e.into())
        } else {
            StoreError::StorageCorrupt {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    info!(file = ?path, count = tasks.len(), "Loaded tasks");
    Ok(Some(tasks))
}

/// Rewrite the task file with the full list
///
/// Data goes to a sibling temp file which is synced and then renamed over
/// the target, so readers see either the old list or the new one.
pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(parent, e))?;
    }

    let tmp_path = sibling(path, "tmp");
    let file = File::create(&tmp_path).map_err(|e| StoreError::unavailable(&tmp_path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, tasks).map_err(|e| StoreError::unavailable(&tmp_path, e.into()))?;
    writer.flush().map_err(|e| StoreError::unavailable(&tmp_path, e))?;

    let file = writer
        .into_inner()
        .map_err(|e| StoreError::unavailable(&tmp_path, e.into_error()))?;
    file.sync_all().map_err(|e| StoreError::unavailable(&tmp_path, e))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| StoreError::unavailable(path, e))?;

    debug!(file = ?path, count = tasks.len(), "Saved tasks");
    Ok(())
}

/// `tasks.json` -> `tasks.json.<suffix>`
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = read_tasks(&temp.path().join("tasks.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        let tasks = vec![
            Task::new("Buy milk"),
            Task {
                title: "Walk dog".to_string(),
                completed: true,
            },
        ];
        write_tasks(&path, &tasks).unwrap();

        let loaded = read_tasks(&path).unwrap().unwrap();
        assert_eq!(loaded, tasks);
        assert!(!sibling(&path, "tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("tasks.json");

        write_tasks(&path, &[Task::new("Buy milk")]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_replaces_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        write_tasks(&path, &[Task::new("a"), Task::new("b"), Task::new("c")]).unwrap();
        write_tasks(&path, &[Task::new("z")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, r#"[{"title":"z","completed":false}]"#);
    }

    #[test]
    fn test_reads_python_style_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        fs::write(&path, r#"[{"title": "Buy milk", "completed": true}, {"title": "Walk dog", "completed": false}]"#).unwrap();

        let loaded = read_tasks(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[0].completed);
        assert_eq!(loaded[1].title, "Walk dog");
    }

    #[test]
    fn test_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_tasks(&path).unwrap_err();
        assert!(matches!(err, StoreError::StorageCorrupt { .. }));
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        fs::write(&path, r#"{"title": "not a list", "completed": false}"#).unwrap();

        let err = read_tasks(&path).unwrap_err();
        assert!(matches!(err, StoreError::StorageCorrupt { .. }));
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(sibling(Path::new("tasks.json"), "lock"), PathBuf::from("tasks.json.lock"));
        assert_eq!(
            sibling(Path::new("/data/tasks.json"), "tmp"),
            PathBuf::from("/data/tasks.json.tmp")
        );
    }
}
