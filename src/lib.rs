// todolist - single-user task tracker persisted to a JSON file

pub mod error;
pub mod filter;
pub mod json;
pub mod session;
pub mod store;
pub mod task;
pub mod view;

// Re-export main types for convenience
pub use error::StoreError;
pub use filter::{Filter, TaskRow};
pub use session::Session;
pub use store::{CorruptPolicy, DEFAULT_TASKS_FILE, TaskStore, read_snapshot};
pub use task::{Status, Task};
