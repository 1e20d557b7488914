//! The request seam between board state and the task API.

use crate::types::{
    CreateTaskRequest, CreateTaskResponse, MessageResponse, ReorderRequest, ReorderResponse, Task,
    UpdateTaskRequest, UpdateTaskResponse,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by board client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, and the like.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server does not know the task.
    #[error("task {0} not found")]
    NotFound(i64),

    /// Any other non-success response.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// A local drag/drop move referenced a task or slot that does not exist.
    #[error("invalid move: {0}")]
    InvalidMove(String),
}

/// Operations the board needs from the task API.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /tasks`
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;

    /// `POST /tasks`
    async fn create_task(&self, request: &CreateTaskRequest)
    -> Result<CreateTaskResponse, ClientError>;

    /// `PUT /tasks/{id}`
    async fn update_task(
        &self,
        task_id: i64,
        request: &UpdateTaskRequest,
    ) -> Result<UpdateTaskResponse, ClientError>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, task_id: i64) -> Result<MessageResponse, ClientError>;

    /// `POST /tasks/reorder`
    async fn reorder(&self, request: &ReorderRequest) -> Result<ReorderResponse, ClientError>;
}
