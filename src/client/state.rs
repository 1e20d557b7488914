//! Client-side board state.
//!
//! [`Board`] mirrors the server's active tasks as three ordered columns.
//! Each operation sends its request first and touches local state only once
//! the server has accepted it. Failed requests are logged and returned; local
//! state is left as it was and nothing is retried.

use super::api::{BoardApi, ClientError};
use crate::types::{CreateTaskRequest, ReorderColumn, ReorderRequest, Status, Task, TaskRef, UpdateTaskRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Prompt shown before a task is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Receives the short success messages the server returns.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "kanban_board::notify", "{}", message);
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// One board column and its tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: Status,
    pub title: &'static str,
    pub tasks: Vec<Task>,
}

impl BoardColumn {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            title: status.title(),
            tasks: Vec::new(),
        }
    }

    fn position_of(&self, task_id: i64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}

/// The task being edited and its in-progress text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub task_id: i64,
    pub text: String,
}

/// Group tasks into the three columns, each sorted by position (ties by id).
pub fn partition(tasks: Vec<Task>) -> [BoardColumn; 3] {
    let mut columns = Status::ALL.map(BoardColumn::new);
    for task in tasks {
        columns[task.status.index()].tasks.push(task);
    }
    for column in &mut columns {
        column.tasks.sort_by_key(|t| (t.position, t.id));
    }
    columns
}

/// In-memory mirror of the board.
pub struct Board<A: BoardApi> {
    api: A,
    columns: [BoardColumn; 3],
    drafts: HashMap<Status, String>,
    adding: HashMap<Status, bool>,
    editing: Option<EditSession>,
    dragging: bool,
    notifier: Arc<dyn Notifier>,
}

impl<A: BoardApi> Board<A> {
    /// Empty board backed by `api`. Call [`Board::fetch_tasks`] to load it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            columns: Status::ALL.map(BoardColumn::new),
            drafts: HashMap::new(),
            adding: HashMap::new(),
            editing: None,
            dragging: false,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Route success messages to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    /// Direct access for UI code that rearranges tasks itself. Pair with
    /// [`Board::start_drag`] and [`Board::persist_order`].
    pub fn columns_mut(&mut self) -> &mut [BoardColumn] {
        &mut self.columns
    }

    pub fn column(&self, status: Status) -> &BoardColumn {
        &self.columns[status.index()]
    }

    /// Find a task and the column holding it.
    pub fn task(&self, task_id: i64) -> Option<(Status, &Task)> {
        self.columns.iter().find_map(|c| {
            c.tasks
                .iter()
                .find(|t| t.id == task_id)
                .map(|t| (c.status, t))
        })
    }

    fn task_mut(&mut self, task_id: i64) -> Option<&mut Task> {
        self.columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }

    // Drafts for the "add task" input of each column

    pub fn draft(&self, status: Status) -> &str {
        self.drafts.get(&status).map(String::as_str).unwrap_or("")
    }

    pub fn set_draft(&mut self, status: Status, text: impl Into<String>) {
        self.drafts.insert(status, text.into());
    }

    pub fn is_adding(&self, status: Status) -> bool {
        self.adding.get(&status).copied().unwrap_or(false)
    }

    pub fn set_adding(&mut self, status: Status, adding: bool) {
        self.adding.insert(status, adding);
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Load all active tasks, replacing the current columns.
    pub async fn fetch_tasks(&mut self) -> Result<(), ClientError> {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "Fetched tasks");
                self.columns = partition(tasks);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching tasks: {}", e);
                Err(e)
            }
        }
    }

    /// Create a task from the column's draft.
    ///
    /// A blank draft sends nothing and returns `Ok(None)`.
    pub async fn add_task(&mut self, status: Status) -> Result<Option<Task>, ClientError> {
        let description = self.draft(status).to_string();
        if description.trim().is_empty() {
            return Ok(None);
        }

        let request = CreateTaskRequest {
            description,
            status,
        };
        let response = self.api.create_task(&request).await.inspect_err(|e| {
            error!("Error adding task: {}", e);
        })?;

        let task = response.task;
        self.columns[task.status.index()].tasks.push(task.clone());
        self.drafts.insert(status, String::new());
        self.adding.insert(status, false);
        self.notifier.notify(&response.message);
        Ok(Some(task))
    }

    /// Start editing a task. Returns false if the task is not on the board.
    pub fn edit_task(&mut self, task_id: i64) -> bool {
        let Some((_, task)) = self.task(task_id) else {
            return false;
        };
        self.editing = Some(EditSession {
            task_id,
            text: task.description.clone(),
        });
        true
    }

    /// Replace the in-progress edit text.
    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(session) = self.editing.as_mut() {
            session.text = text.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Send the edit session's text.
    ///
    /// Blank text cancels the edit without a request. Returns whether an
    /// update was applied.
    pub async fn commit_edit(&mut self) -> Result<bool, ClientError> {
        let Some(session) = self.editing.clone() else {
            return Ok(false);
        };
        if session.text.trim().is_empty() {
            self.cancel_edit();
            return Ok(false);
        }

        let request = UpdateTaskRequest {
            description: session.text.clone(),
        };
        let response = self
            .api
            .update_task(session.task_id, &request)
            .await
            .inspect_err(|e| error!("Error updating task: {}", e))?;

        if let Some(task) = self.task_mut(session.task_id) {
            task.description = session.text;
            if let Some(updated) = response.task {
                task.updated_at = updated.updated_at;
                task.updated_by = updated.updated_by;
            }
        }
        self.cancel_edit();
        self.notifier.notify(&response.message);
        Ok(true)
    }

    /// Delete a task after confirmation. Returns false if declined.
    pub async fn delete_task<C: Confirm + ?Sized>(
        &mut self,
        task_id: i64,
        confirm: &C,
    ) -> Result<bool, ClientError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        let response = self
            .api
            .delete_task(task_id)
            .await
            .inspect_err(|e| error!("Error deleting task: {}", e))?;

        for column in &mut self.columns {
            column.tasks.retain(|t| t.id != task_id);
        }
        if self.editing.as_ref().is_some_and(|s| s.task_id == task_id) {
            self.cancel_edit();
        }
        self.notifier.notify(&response.message);
        Ok(true)
    }

    /// Mark a drag as in progress so the next [`Board::persist_order`] sends.
    pub fn start_drag(&mut self) {
        self.dragging = true;
    }

    /// Move a task to `index` in column `to`, locally only.
    ///
    /// `index` is the task's final slot in the destination column.
    pub fn move_task(&mut self, task_id: i64, to: Status, index: usize) -> Result<(), ClientError> {
        let (from, from_index) = self
            .columns
            .iter()
            .find_map(|c| c.position_of(task_id).map(|i| (c.status, i)))
            .ok_or_else(|| ClientError::InvalidMove(format!("task {} is not on the board", task_id)))?;

        let limit = if from == to {
            self.columns[to.index()].tasks.len() - 1
        } else {
            self.columns[to.index()].tasks.len()
        };
        if index > limit {
            return Err(ClientError::InvalidMove(format!(
                "index {} is past the end of column {} ({} tasks)",
                index,
                to.title(),
                limit
            )));
        }

        let task = self.columns[from.index()].tasks.remove(from_index);
        self.columns[to.index()].tasks.insert(index, task);
        Ok(())
    }

    /// The current arrangement as a reorder request.
    pub fn reorder_request(&self) -> ReorderRequest {
        ReorderRequest {
            columns: self
                .columns
                .iter()
                .map(|c| ReorderColumn {
                    id: c.status,
                    tasks: c.tasks.iter().map(|t| TaskRef { id: t.id }).collect(),
                })
                .collect(),
        }
    }

    /// Send the current arrangement if a drag is in progress.
    ///
    /// Does nothing unless [`Board::start_drag`] was called. The drag flag is
    /// cleared whatever the outcome. On success every task's `status` and
    /// `position` are rewritten to match the server; tasks the server
    /// skipped are dropped from the board.
    pub async fn persist_order(&mut self) -> Result<bool, ClientError> {
        if !self.dragging {
            return Ok(false);
        }

        let request = self.reorder_request();
        let result = self.api.reorder(&request).await;
        self.dragging = false;

        let response = result.inspect_err(|e| error!("Error updating tasks: {}", e))?;

        for column in &mut self.columns {
            column.tasks.retain(|t| !response.summary.skipped.contains(&t.id));
            for (position, task) in (0_i64..).zip(column.tasks.iter_mut()) {
                task.status = column.status;
                task.position = position;
            }
        }
        self.notifier.notify(&response.message);
        Ok(true)
    }
}
