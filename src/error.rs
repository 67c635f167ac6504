// Error types for task store operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`TaskStore`](crate::TaskStore) operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// An operation that needs a target position was called without one
    #[error("no task selected")]
    NoSelection,

    /// The position does not reference a task in the current collection
    #[error("no task at position {position} (have {len})")]
    InvalidPosition { position: usize, len: usize },

    /// Title was empty or the input was cancelled
    #[error("task title is empty")]
    EmptyInput,

    /// The durable copy exists but is not a well-formed task list
    #[error("task file {path} is corrupt: {source}")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the durable copy failed
    #[error("task file {path} is unavailable: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process already has this task file open
    #[error("task file {path} is in use by another process")]
    StoreLocked { path: PathBuf },
}

impl StoreError {
    /// True for validation failures the caller should show as a warning and carry on from.
    ///
    /// Storage errors return false and must be propagated.
    pub fn is_user_warning(&self) -> bool {
        matches!(self, StoreError::NoSelection | StoreError::InvalidPosition { .. })
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_warning_classification() {
        assert!(StoreError::NoSelection.is_user_warning());
        assert!(StoreError::InvalidPosition { position: 5, len: 2 }.is_user_warning());
        assert!(!StoreError::EmptyInput.is_user_warning());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!StoreError::unavailable("tasks.json", io).is_user_warning());
        assert!(!StoreError::StoreLocked { path: "tasks.json".into() }.is_user_warning());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidPosition { position: 5, len: 2 };
        assert_eq!(err.to_string(), "no task at position 5 (have 2)");
        assert_eq!(StoreError::EmptyInput.to_string(), "task title is empty");
    }
}
