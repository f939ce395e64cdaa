//! Edit state machine
//!
//! Tracks whether the list is idle, editing a task, or collecting a subtask.

mod events;
mod states;
mod transitions;

pub use events::EditEvent;
pub use states::EditState;
pub use transitions::{EditStateMachine, StateTransition};
