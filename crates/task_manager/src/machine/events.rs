//! Edit events - user intents that move the edit state

use crate::structs::{EditDraft, TaskId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditEvent {
    /// Edit form opened for a task, pre-filled with its current values.
    EditStarted { task_id: TaskId, draft: EditDraft },

    /// Pending values changed.
    DraftUpdated { draft: EditDraft },

    /// Pending values written back to the task.
    EditCommitted,

    /// Pending edit abandoned.
    EditCancelled,

    /// Subtask input shown or hidden for a task.
    SubtaskInputToggled { task_id: TaskId },

    /// A subtask was appended to a task.
    SubtaskAdded { task_id: TaskId },

    /// A new task was appended.
    TaskCreated,

    /// A task left the collection.
    TaskRemoved { task_id: TaskId },
}

impl EditEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EditEvent::EditStarted { .. } => "edit_started",
            EditEvent::DraftUpdated { .. } => "draft_updated",
            EditEvent::EditCommitted => "edit_committed",
            EditEvent::EditCancelled => "edit_cancelled",
            EditEvent::SubtaskInputToggled { .. } => "subtask_input_toggled",
            EditEvent::SubtaskAdded { .. } => "subtask_added",
            EditEvent::TaskCreated => "task_created",
            EditEvent::TaskRemoved { .. } => "task_removed",
        }
    }
}
