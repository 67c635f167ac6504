// Status filter for listing tasks

use crate::task::{Status, Task};
use std::str::FromStr;
use thiserror::Error;

/// View selector applied when listing tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

    /// Whether a task belongs in this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Pending => "pending",
            Filter::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "All"),
            Filter::Pending => write!(f, "Pending"),
            Filter::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter '{0}' (expected all, pending or completed)")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" | "done" => Ok(Filter::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// One row of a listing
///
/// `position` is always the task's position in the unfiltered collection,
/// so it can be passed straight back to a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub position: usize,
    pub title: String,
    pub status: Status,
}

/// Select the rows of `tasks` matching `filter`, in collection order
pub fn apply(tasks: &[Task], filter: Filter) -> Vec<TaskRow> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| filter.matches(task))
        .map(|(index, task)| TaskRow {
            position: index + 1,
            title: task.title.clone(),
            status: task.status(),
        })
        .collect()
}
