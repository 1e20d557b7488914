//! HTTP server implementation for the board.
//!
//! This module provides the axum-based HTTP server that serves the board page
//! and exposes the task REST endpoints.

use axum::{
    Router,
    extract::{
        FromRequestParts, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Json},
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::templates;
use crate::config::SoftDeletePolicy;
use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    ActorId, CreateTaskRequest, CreateTaskResponse, MessageResponse, ReorderRequest,
    ReorderResponse, Task, UpdateTaskRequest, UpdateTaskResponse,
};

/// Request header naming the acting user.
pub const ACTOR_HEADER: &str = "x-actor-id";

const MSG_ADDED: &str = "Task added successfully!";
const MSG_UPDATED: &str = "Task updated successfully!";
const MSG_DELETED: &str = "Task deleted successfully!";

/// Board server state shared across handlers.
#[derive(Clone)]
pub struct BoardServer {
    /// Reference to the task database.
    db: Arc<Database>,
    /// Actor used when a request carries no actor header.
    default_actor: ActorId,
    /// How soft-deleted rows take part in lookups.
    policy: SoftDeletePolicy,
}

impl BoardServer {
    /// Create a new board server instance.
    pub fn new(db: Arc<Database>, default_actor: ActorId, policy: SoftDeletePolicy) -> Self {
        Self {
            db,
            default_actor,
            policy,
        }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// Get the soft-delete policy.
    pub fn policy(&self) -> &SoftDeletePolicy {
        &self.policy
    }
}

/// Acting user for a request: the `X-Actor-Id` header, else the server default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub ActorId);

impl FromRequestParts<BoardServer> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &BoardServer,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Actor(state.default_actor));
        };
        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|id| Actor(ActorId(id)))
            .ok_or_else(|| {
                ApiError::invalid_value(ACTOR_HEADER, "actor id must be an integer")
                    .with_status(StatusCode::BAD_REQUEST)
            })
    }
}

fn body_error(rejection: JsonRejection) -> ApiError {
    let text = rejection.body_text();
    if let JsonRejection::JsonDataError(_) = &rejection
        && let Some(field) = missing_field_name(&text)
    {
        return ApiError::missing_field(field);
    }
    ApiError::invalid_value("body", text).with_status(rejection.status())
}

/// Field name from serde's "missing field `name`" message.
fn missing_field_name(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("missing field `")?;
    let (name, _) = rest.split_once('`')?;
    Some(name)
}

fn path_error(rejection: PathRejection) -> ApiError {
    ApiError::invalid_value("id", rejection.body_text()).with_status(rejection.status())
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Root endpoint - serves the board page shell.
async fn root() -> Html<&'static str> {
    Html(templates::BOARD_TEMPLATE)
}

/// List all active tasks.
async fn list_tasks(State(state): State<BoardServer>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.db().list_active_tasks()?))
}

/// Create a task at the end of its column.
async fn create_task(
    State(state): State<BoardServer>,
    Actor(actor): Actor,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<CreateTaskResponse>> {
    let Json(request) = body.map_err(body_error)?;
    let task = state.db().create_task(&request, actor, state.policy())?;
    Ok(Json(CreateTaskResponse {
        task,
        status: StatusCode::OK.as_u16(),
        message: MSG_ADDED.to_string(),
    }))
}

/// Replace a task's description.
async fn update_task(
    State(state): State<BoardServer>,
    Actor(actor): Actor,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateTaskResponse>> {
    let Path(task_id) = path.map_err(path_error)?;
    let Json(request) = body.map_err(body_error)?;
    let task =
        state
            .db()
            .update_task_description(task_id, &request.description, actor, state.policy())?;
    Ok(Json(UpdateTaskResponse {
        status: StatusCode::OK.as_u16(),
        message: MSG_UPDATED.to_string(),
        task: Some(task),
    }))
}

/// Soft-delete a task.
async fn delete_task(
    State(state): State<BoardServer>,
    Actor(actor): Actor,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(task_id) = path.map_err(path_error)?;
    state.db().soft_delete_task(task_id, actor, state.policy())?;
    Ok(Json(MessageResponse {
        status: StatusCode::OK.as_u16(),
        message: MSG_DELETED.to_string(),
    }))
}

/// Rewrite column and position of every task in the request.
async fn reorder_tasks(
    State(state): State<BoardServer>,
    Actor(actor): Actor,
    body: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<ReorderResponse>> {
    let Json(request) = body.map_err(body_error)?;
    let summary = state.db().reorder_tasks(&request, actor)?;
    Ok(Json(ReorderResponse {
        message: MSG_UPDATED.to_string(),
        summary,
    }))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(state: BoardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page routes
        .route("/", get(root))
        // Task API
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/reorder", post(reorder_tasks))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/health", get(health))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle for managing a running server.
pub struct BoardHandle {
    /// Channel to signal shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Address the listener is bound to.
    addr: SocketAddr,
    /// The serving task.
    task: JoinHandle<()>,
}

impl BoardHandle {
    /// Address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients of this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!("Board server task failed: {}", e);
        }
    }
}

/// Start the HTTP server on the given address.
///
/// Port 0 binds an ephemeral port; the handle reports the actual address.
pub async fn start_server(state: BoardServer, addr: SocketAddr) -> anyhow::Result<BoardHandle> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Board server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Board server shutting down");
            })
            .await
        {
            tracing::error!("Board server error: {}", e);
        }
    });

    Ok(BoardHandle {
        shutdown_tx: Some(shutdown_tx),
        addr: bound_addr,
        task,
    })
}
