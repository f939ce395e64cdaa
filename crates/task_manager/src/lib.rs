//! # Task Manager
//!
//! Owns a to-do list: creation, subtasks, editing, completion, duplication,
//! sorting and filtering, with the full list written to storage after every
//! change.

pub mod config;
pub mod error;
pub mod machine;
pub mod manager;
pub mod storage;
pub mod structs;
pub mod view;

// Re-exports
pub use config::TaskManagerConfig;
pub use error::{Result, TaskError};
pub use machine::{EditEvent, EditState, EditStateMachine};
pub use manager::TaskListManager;
pub use storage::{validate_list_key, FileTaskStorage, MemoryTaskStorage, TaskStorage};
pub use structs::{parse_due_date, Category, EditDraft, Priority, Task, TaskId};
pub use view::{CompletionStats, SearchScope, SortCriterion, View, ViewState};
