// Task data model

use serde::{Deserialize, Serialize};

/// One to-do entry
///
/// Tasks carry no identifier of their own. A task is referred to by its
/// 1-based position in the store's ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub completed: bool,
}

impl Task {
    /// Create a pending task
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }

    pub fn status(&self) -> Status {
        if self.completed { Status::Done } else { Status::Pending }
    }
}

/// Display status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Done,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Done => "Done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("Buy milk");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.status(), Status::Pending);
    }

    #[test]
    fn test_status_labels() {
        let mut task = Task::new("Walk dog");
        task.completed = true;
        assert_eq!(task.status().to_string(), "Done");
        assert_eq!(Status::Pending.to_string(), "Pending");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&Task::new("Buy milk")).unwrap();
        assert_eq!(json, r#"{"title":"Buy milk","completed":false}"#);

        let task: Task = serde_json::from_str(r#"{"title": "Walk dog", "completed": true}"#).unwrap();
        assert_eq!(task.title, "Walk dog");
        assert!(task.completed);
    }
}
