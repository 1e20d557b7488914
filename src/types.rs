//! Core types for the Kanban board.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Board column a task lives in.
///
/// Serialized as the integer column id. Deserialization also accepts the
/// numeric string form (`"1"`) that browser clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "StatusRepr", into = "u8")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// All columns in board order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Integer column id as stored in the database.
    pub fn id(self) -> u8 {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    /// Column id to status; `None` outside `0..=2`.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Status::Todo),
            1 => Some(Status::InProgress),
            2 => Some(Status::Done),
            _ => None,
        }
    }

    /// Column heading shown on the board.
    pub fn title(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    /// Index of this column in [`Status::ALL`].
    pub fn index(self) -> usize {
        usize::from(self.id())
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.id()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "todo" | "to do" | "to-do" => return Ok(Status::Todo),
            "in progress" | "in-progress" | "in_progress" | "doing" => {
                return Ok(Status::InProgress);
            }
            "done" => return Ok(Status::Done),
            _ => {}
        }
        trimmed
            .parse::<i64>()
            .ok()
            .and_then(Status::from_id)
            .ok_or_else(|| format!("invalid status '{}': expected 0, 1 or 2", s))
    }
}

/// Wire form accepted for a status: integer or numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Int(i64),
    Str(String),
}

impl TryFrom<StatusRepr> for Status {
    type Error = String;

    fn try_from(repr: StatusRepr) -> Result<Self, Self::Error> {
        match repr {
            StatusRepr::Int(id) => {
                Status::from_id(id).ok_or_else(|| format!("invalid status {}: expected 0, 1 or 2", id))
            }
            StatusRepr::Str(s) => s.parse(),
        }
    }
}

/// Identifier of whoever performs a mutation, recorded in the audit columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub i64);

impl Default for ActorId {
    fn default() -> Self {
        ActorId(1)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub status: Status,
    pub position: i64,
    pub created_by: i64,
    pub updated_by: Option<i64>,
    pub deleted_by: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl Task {
    /// Whether the row has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    #[serde(default)]
    pub status: Status,
}

/// Body of `PUT /tasks/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub description: String,
}

/// A task reference inside a reorder column. Other task fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: i64,
}

/// One column of a reorder request, tasks in their new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderColumn {
    pub id: Status,
    #[serde(default)]
    pub tasks: Vec<TaskRef>,
}

/// Body of `POST /tasks/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub columns: Vec<ReorderColumn>,
}

/// Outcome of a reorder batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSummary {
    /// Rows rewritten.
    pub updated: usize,
    /// Ids that matched no active row.
    pub skipped: Vec<i64>,
}

/// Response of `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub task: Task,
    pub status: u16,
    pub message: String,
}

/// Response of `PUT /tasks/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskResponse {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

/// Response of `DELETE /tasks/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: u16,
    pub message: String,
}

/// Response of `POST /tasks/reorder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: ReorderSummary,
}

/// Check a description against the column constraints. Accepted text is
/// stored as given, without trimming.
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("description must not be blank".to_string());
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "description is {} characters, maximum is {}",
            len, MAX_DESCRIPTION_LEN
        ));
    }
    Ok(())
}
