//! Edit states - what the list is currently collecting input for

use crate::structs::{EditDraft, TaskId};
use serde::{Deserialize, Serialize};

/// Interaction mode of the task list.
///
/// At most one input is open at a time: either the edit form for one task
/// or the subtask input for one task.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    /// No pending input.
    Idle,

    /// An edit was started and has not been committed or cancelled.
    Editing {
        /// Task the draft will be written back to.
        task_id: TaskId,
        /// Pending field values.
        draft: EditDraft,
    },

    /// The subtask input is open for a task.
    AddingSubtask { task_id: TaskId },
}

impl Default for EditState {
    fn default() -> Self {
        Self::Idle
    }
}

impl EditState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditState::Idle)
    }

    /// Pending values, present only while editing.
    pub fn draft(&self) -> Option<&EditDraft> {
        match self {
            EditState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }
}
