//! reqwest-backed [`BoardApi`].

use super::api::{BoardApi, ClientError};
use crate::dashboard::ACTOR_HEADER;
use crate::types::{
    ActorId, CreateTaskRequest, CreateTaskResponse, MessageResponse, ReorderRequest,
    ReorderResponse, Task, UpdateTaskRequest, UpdateTaskResponse,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Talks to a board server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    actor: Option<ActorId>,
}

impl HttpBoardApi {
    /// Client for the server at `base_url` (e.g. `http://127.0.0.1:31995`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout,
            actor: None,
        }
    }

    /// Send an `X-Actor-Id` header with every mutating request.
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.timeout(self.timeout);
        match self.actor {
            Some(actor) => builder.header(ACTOR_HEADER, actor.0.to_string()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        task_id: Option<i64>,
    ) -> Result<T, ClientError> {
        let response = self.prepare(builder).send().await?;
        decode(response, task_id).await
    }
}

/// Turn a response into `T`, mapping error statuses to [`ClientError`].
async fn decode<T: DeserializeOwned>(response: Response, task_id: Option<i64>) -> Result<T, ClientError> {
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "Board API response");

    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()));
    }

    if status == StatusCode::NOT_FOUND
        && let Some(id) = task_id
    {
        return Err(ClientError::NotFound(id));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.send(self.client.get(self.url("/tasks")), None).await
    }

    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<CreateTaskResponse, ClientError> {
        self.send(self.client.post(self.url("/tasks")).json(request), None)
            .await
    }

    async fn update_task(
        &self,
        task_id: i64,
        request: &UpdateTaskRequest,
    ) -> Result<UpdateTaskResponse, ClientError> {
        let url = self.url(&format!("/tasks/{}", task_id));
        self.send(self.client.put(url).json(request), Some(task_id))
            .await
    }

    async fn delete_task(&self, task_id: i64) -> Result<MessageResponse, ClientError> {
        let url = self.url(&format!("/tasks/{}", task_id));
        self.send(self.client.delete(url), Some(task_id)).await
    }

    async fn reorder(&self, request: &ReorderRequest) -> Result<ReorderResponse, ClientError> {
        self.send(self.client.post(self.url("/tasks/reorder")).json(request), None)
            .await
    }
}
