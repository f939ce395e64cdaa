//! Edit state transitions

use super::events::EditEvent;
use super::states::EditState;

/// Result of feeding one event to the machine.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: EditState,
    /// The state after the transition.
    pub to: EditState,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// Event-driven machine for the list's edit state.
///
/// Events that are not legal in the current state leave it unchanged and
/// come back with `changed == false`.
#[derive(Debug, Clone)]
pub struct EditStateMachine {
    current_state: EditState,
}

impl Default for EditStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl EditStateMachine {
    /// Create a new machine in Idle state.
    pub fn new() -> Self {
        Self::with_state(EditState::Idle)
    }

    pub fn with_state(state: EditState) -> Self {
        Self {
            current_state: state,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.current_state
    }

    /// Handle an event and transition to the next state.
    pub fn handle_event(&mut self, event: EditEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        if changed {
            tracing::debug!(event = event.name(), from = ?old_state, to = ?new_state, "edit state transition");
        }
        self.current_state = new_state.clone();

        StateTransition {
            from: old_state,
            to: new_state,
            changed,
        }
    }

    fn compute_next_state(state: &EditState, event: &EditEvent) -> EditState {
        use EditEvent::*;
        use EditState::*;

        match (state, event) {
            // A new edit replaces whatever input was open
            (_, EditStarted { task_id, draft }) => Editing {
                task_id: *task_id,
                draft: draft.clone(),
            },

            (Editing { task_id, .. }, DraftUpdated { draft }) => Editing {
                task_id: *task_id,
                draft: draft.clone(),
            },
            (Editing { .. }, EditCommitted) => Idle,
            (Editing { .. }, EditCancelled) => Idle,
            (Editing { .. }, TaskCreated) => Idle,

            (AddingSubtask { task_id: open }, SubtaskInputToggled { task_id }) if open == task_id => {
                Idle
            }
            (Idle | AddingSubtask { .. }, SubtaskInputToggled { task_id }) => AddingSubtask {
                task_id: *task_id,
            },
            (AddingSubtask { task_id: open }, SubtaskAdded { task_id }) if open == task_id => Idle,

            (Editing { task_id: open, .. } | AddingSubtask { task_id: open }, TaskRemoved { task_id })
                if open == task_id =>
            {
                Idle
            }

            _ => state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{Category, EditDraft, Priority, TaskId};
    use chrono::NaiveDate;

    fn draft(text: &str) -> EditDraft {
        EditDraft {
            text: text.to_string(),
            category: Category::Work,
            priority: Priority::Medium,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        }
    }

    #[test]
    fn test_edit_flow() {
        let mut sm = EditStateMachine::new();
        let id = TaskId::new();

        let t1 = sm.handle_event(EditEvent::EditStarted {
            task_id: id,
            draft: draft("old"),
        });
        assert!(t1.changed);
        assert!(t1.from.is_idle());
        assert!(matches!(sm.state(), EditState::Editing { task_id, .. } if *task_id == id));

        sm.handle_event(EditEvent::DraftUpdated { draft: draft("new") });
        assert_eq!(sm.state().draft().map(|d| d.text.as_str()), Some("new"));

        let t3 = sm.handle_event(EditEvent::EditCommitted);
        assert!(t3.changed);
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_new_edit_overwrites_pending_one() {
        let mut sm = EditStateMachine::new();
        let first = TaskId::new();
        let second = TaskId::new();

        sm.handle_event(EditEvent::EditStarted { task_id: first, draft: draft("a") });
        sm.handle_event(EditEvent::EditStarted { task_id: second, draft: draft("b") });

        assert!(matches!(sm.state(), EditState::Editing { task_id, draft } if *task_id == second && draft.text == "b"));
    }

    #[test]
    fn test_commit_while_idle_is_ignored() {
        let mut sm = EditStateMachine::new();
        let t = sm.handle_event(EditEvent::EditCommitted);
        assert!(!t.changed);
        assert_eq!(t.from, t.to);
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_create_ends_edit() {
        let mut sm = EditStateMachine::new();
        sm.handle_event(EditEvent::EditStarted { task_id: TaskId::new(), draft: draft("a") });
        sm.handle_event(EditEvent::TaskCreated);
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_subtask_input_toggle() {
        let mut sm = EditStateMachine::new();
        let a = TaskId::new();
        let b = TaskId::new();

        sm.handle_event(EditEvent::SubtaskInputToggled { task_id: a });
        assert_eq!(sm.state(), &EditState::AddingSubtask { task_id: a });

        // Opening it on another task moves it there
        sm.handle_event(EditEvent::SubtaskInputToggled { task_id: b });
        assert_eq!(sm.state(), &EditState::AddingSubtask { task_id: b });

        sm.handle_event(EditEvent::SubtaskInputToggled { task_id: b });
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_subtask_toggle_ignored_while_editing() {
        let mut sm = EditStateMachine::new();
        let id = TaskId::new();
        sm.handle_event(EditEvent::EditStarted { task_id: id, draft: draft("a") });
        let t = sm.handle_event(EditEvent::SubtaskInputToggled { task_id: id });
        assert!(!t.changed);
        assert!(matches!(sm.state(), EditState::Editing { .. }));
    }

    #[test]
    fn test_removing_edited_task_returns_to_idle() {
        let mut sm = EditStateMachine::new();
        let id = TaskId::new();
        sm.handle_event(EditEvent::EditStarted { task_id: id, draft: draft("a") });

        sm.handle_event(EditEvent::TaskRemoved { task_id: TaskId::new() });
        assert!(!sm.state().is_idle());

        sm.handle_event(EditEvent::TaskRemoved { task_id: id });
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_cancel_reports_previous_state() {
        let mut sm = EditStateMachine::new();
        let id = TaskId::new();
        sm.handle_event(EditEvent::EditStarted { task_id: id, draft: draft("a") });

        let t = sm.handle_event(EditEvent::EditCancelled);
        assert!(t.changed);
        assert_eq!(t.from.draft().map(|d| d.text.as_str()), Some("a"));
        assert!(t.to.is_idle());
    }
}
