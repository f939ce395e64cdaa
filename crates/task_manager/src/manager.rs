//! Task list manager service

use crate::config::{TaskManagerConfig, DEFAULT_LIST_KEY};
use crate::error::{Result, TaskError};
use crate::machine::{EditEvent, EditState, EditStateMachine};
use crate::storage::{validate_list_key, TaskStorage};
use crate::structs::{Category, EditDraft, Priority, Task, TaskId};
use crate::view::{
    completion_stats, filter_tasks, sort_tasks, CompletionStats, SearchScope, SortCriterion,
    View, ViewState,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything the manager owns, guarded by one lock.
#[derive(Debug, Default)]
struct ListState {
    tasks: Vec<Task>,
    view: ViewState,
    edit: EditStateMachine,
}

impl ListState {
    fn find_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn find(&self, id: TaskId) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))
    }
}

/// Task List Manager - sole owner of the task collection.
///
/// Every mutation writes the full collection to storage before the lock is
/// released. Storage failures are logged and the in-memory list is kept.
pub struct TaskListManager<S: TaskStorage> {
    storage: Arc<S>,
    state: Arc<RwLock<ListState>>,
    list_key: String,
    search_scope: SearchScope,
}

impl<S: TaskStorage> Clone for TaskListManager<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            state: Arc::clone(&self.state),
            list_key: self.list_key.clone(),
            search_scope: self.search_scope,
        }
    }
}

impl<S: TaskStorage> TaskListManager<S> {
    /// Create a manager for the list stored under `list_key`, restoring it
    /// from storage. An absent list starts empty. Keys that are not a plain
    /// name are rejected with `InvalidValue`.
    pub async fn new(storage: S, list_key: impl Into<String>) -> Result<Self> {
        let list_key = list_key.into();
        validate_list_key(&list_key)?;
        let tasks = storage.load_tasks(&list_key).await?;
        match &tasks {
            Some(tasks) => tracing::info!(list = %list_key, count = tasks.len(), "restored task list"),
            None => tracing::info!(list = %list_key, "no stored task list, starting empty"),
        }

        Ok(Self {
            storage: Arc::new(storage),
            state: Arc::new(RwLock::new(ListState {
                tasks: tasks.unwrap_or_default(),
                ..ListState::default()
            })),
            list_key,
            search_scope: SearchScope::default(),
        })
    }

    /// Create a manager using the list key and search scope from `config`.
    pub async fn with_config(storage: S, config: &TaskManagerConfig) -> Result<Self> {
        let list_key = if config.list_key.trim().is_empty() {
            DEFAULT_LIST_KEY.to_string()
        } else {
            config.list_key.clone()
        };
        Ok(Self::new(storage, list_key)
            .await?
            .with_search_scope(config.search_scope))
    }

    pub fn with_search_scope(mut self, scope: SearchScope) -> Self {
        self.search_scope = scope;
        self
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    pub fn search_scope(&self) -> SearchScope {
        self.search_scope
    }

    async fn persist(&self, tasks: &[Task]) {
        if let Err(e) = self.storage.save_tasks(&self.list_key, tasks).await {
            tracing::warn!(list = %self.list_key, error = %e, "failed to persist task list, keeping in-memory state");
        }
    }

    // ========== Read access ==========

    /// Snapshot of the whole collection in stored order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.tasks.is_empty()
    }

    pub async fn get(&self, id: TaskId) -> Option<Task> {
        self.state.read().await.find(id).ok().cloned()
    }

    /// Id of the task at a 0-based position.
    pub async fn id_at(&self, position: usize) -> Result<TaskId> {
        self.state
            .read()
            .await
            .tasks
            .get(position)
            .map(|task| task.id)
            .ok_or(TaskError::PositionOutOfRange(position))
    }

    /// Current 0-based position of a task.
    pub async fn position_of(&self, id: TaskId) -> Option<usize> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .position(|task| task.id == id)
    }

    /// Tasks visible under `view` with `query`, in collection order.
    pub async fn filter(&self, view: View, query: &str) -> Vec<Task> {
        let state = self.state.read().await;
        filter_tasks(&state.tasks, view, query, self.search_scope)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Tasks visible under the current view state.
    pub async fn visible(&self) -> Vec<Task> {
        let state = self.state.read().await;
        filter_tasks(
            &state.tasks,
            state.view.view,
            &state.view.search_query,
            self.search_scope,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    pub async fn completion_stats(&self) -> CompletionStats {
        completion_stats(&self.state.read().await.tasks)
    }

    pub async fn edit_state(&self) -> EditState {
        self.state.read().await.edit.state().clone()
    }

    pub async fn view_state(&self) -> ViewState {
        self.state.read().await.view.clone()
    }

    // ========== View state ==========

    pub async fn set_view(&self, view: View) {
        self.state.write().await.view.view = view;
    }

    pub async fn set_search_query(&self, query: impl Into<String>) {
        self.state.write().await.view.search_query = query.into();
    }

    // ========== Mutations ==========

    /// Append a new task. Blank text or a missing due date leaves the list
    /// untouched and returns `None`.
    pub async fn create(
        &self,
        text: impl Into<String>,
        category: Category,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Option<TaskId> {
        let text = text.into();
        let Some(due_date) = due_date.filter(|_| !text.trim().is_empty()) else {
            tracing::debug!("rejected task: blank text or missing due date");
            return None;
        };

        let task = Task::new(text, category, priority, due_date);
        let id = task.id;

        let mut state = self.state.write().await;
        state.tasks.push(task);
        state.edit.handle_event(EditEvent::TaskCreated);
        self.persist(&state.tasks).await;

        Some(id)
    }

    /// Append a trimmed subtask. Returns `false` if the trimmed text is empty.
    pub async fn add_subtask(&self, id: TaskId, text: &str) -> Result<bool> {
        let text = text.trim();
        let mut state = self.state.write().await;
        let task = state.find_mut(id)?;
        if text.is_empty() {
            tracing::debug!(task = %id, "rejected blank subtask");
            return Ok(false);
        }

        task.subtasks.push(text.to_string());
        state.edit.handle_event(EditEvent::SubtaskAdded { task_id: id });
        self.persist(&state.tasks).await;

        Ok(true)
    }

    /// Show or hide the subtask input for a task. Returns whether it is
    /// open afterwards.
    pub async fn toggle_subtask_input(&self, id: TaskId) -> Result<bool> {
        let mut state = self.state.write().await;
        state.find(id)?;
        state
            .edit
            .handle_event(EditEvent::SubtaskInputToggled { task_id: id });
        Ok(matches!(state.edit.state(), EditState::AddingSubtask { task_id } if *task_id == id))
    }

    /// Remove a task. Later tasks move up one position.
    pub async fn delete(&self, id: TaskId) -> Result<Task> {
        let mut state = self.state.write().await;
        let position = state
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))?;

        let removed = state.tasks.remove(position);
        state.edit.handle_event(EditEvent::TaskRemoved { task_id: id });
        self.persist(&state.tasks).await;

        Ok(removed)
    }

    /// Flip the completed flag. Returns the new value.
    pub async fn toggle_complete(&self, id: TaskId) -> Result<bool> {
        let mut state = self.state.write().await;
        let task = state.find_mut(id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist(&state.tasks).await;

        Ok(completed)
    }

    /// Start editing a task, capturing its current values as the draft.
    /// Replaces any edit already in progress.
    pub async fn begin_edit(&self, id: TaskId) -> Result<EditDraft> {
        let mut state = self.state.write().await;
        let draft = state.find(id)?.draft();
        state.edit.handle_event(EditEvent::EditStarted {
            task_id: id,
            draft: draft.clone(),
        });
        Ok(draft)
    }

    /// Replace the pending values of the current edit.
    pub async fn update_draft(&self, draft: EditDraft) -> Result<()> {
        let mut state = self.state.write().await;
        if state.edit.state().draft().is_none() {
            return Err(TaskError::NoPendingEdit);
        }
        state.edit.handle_event(EditEvent::DraftUpdated { draft });
        Ok(())
    }

    /// Write the draft back to the task it was captured from.
    ///
    /// Fails with `NotFound` if that task has been removed since
    /// `begin_edit`; the pending edit is dropped in that case.
    pub async fn commit_edit(&self) -> Result<TaskId> {
        let mut state = self.state.write().await;
        let (id, draft) = match state.edit.state() {
            EditState::Editing { task_id, draft } => (*task_id, draft.clone()),
            _ => return Err(TaskError::NoPendingEdit),
        };

        if state.find(id).is_err() {
            state.edit.handle_event(EditEvent::EditCancelled);
            return Err(TaskError::NotFound(id));
        }
        state.find_mut(id)?.apply(draft);
        state.edit.handle_event(EditEvent::EditCommitted);
        self.persist(&state.tasks).await;

        Ok(id)
    }

    /// Abandon the current edit. Returns `false` if none was in progress.
    pub async fn cancel_edit(&self) -> bool {
        self.state
            .write()
            .await
            .edit
            .handle_event(EditEvent::EditCancelled)
            .changed
    }

    /// Remove every completed task. Returns how many were removed.
    pub async fn clear_completed(&self) -> usize {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        let removed: Vec<TaskId> = state
            .tasks
            .iter()
            .filter(|task| task.completed)
            .map(|task| task.id)
            .collect();
        state.tasks.retain(|task| !task.completed);
        for task_id in removed {
            state.edit.handle_event(EditEvent::TaskRemoved { task_id });
        }
        self.persist(&state.tasks).await;

        before - state.tasks.len()
    }

    /// Append a copy of a task, under a new id, at the end of the list.
    pub async fn duplicate(&self, id: TaskId) -> Result<TaskId> {
        let mut state = self.state.write().await;
        let copy = state.find(id)?.duplicate();
        let copy_id = copy.id;
        state.tasks.push(copy);
        self.persist(&state.tasks).await;

        Ok(copy_id)
    }

    /// Reorder the stored list. `SortCriterion::None` only records the
    /// selection and leaves the order as it is.
    pub async fn sort_by(&self, criterion: SortCriterion) {
        let mut state = self.state.write().await;
        state.view.sort = criterion;
        if criterion == SortCriterion::None {
            return;
        }
        sort_tasks(&mut state.tasks, criterion);
        self.persist(&state.tasks).await;
    }
}
