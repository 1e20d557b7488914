//! Board state tests against an in-process API backed by a real database.

use async_trait::async_trait;
use kanban_board::client::{Board, BoardApi, ClientError, DELETE_PROMPT, Notifier};
use kanban_board::config::SoftDeletePolicy;
use kanban_board::db::Database;
use kanban_board::error::ApiError;
use kanban_board::types::{
    ActorId, CreateTaskRequest, CreateTaskResponse, MessageResponse, ReorderRequest,
    ReorderResponse, Status, Task, UpdateTaskRequest, UpdateTaskResponse,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Calls {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
    reorder: AtomicUsize,
}

/// Answers board requests straight from a [`Database`], counting each call.
struct DbApi {
    db: Database,
    calls: Calls,
    failing: AtomicBool,
}

impl DbApi {
    fn new() -> Self {
        Self {
            db: Database::open_in_memory().expect("Failed to create in-memory database"),
            calls: Calls::default(),
            failing: AtomicBool::new(false),
        }
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, counter: &AtomicUsize) -> Result<(), ClientError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Server {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn to_client_error(task_id: Option<i64>, err: anyhow::Error) -> ClientError {
    let api = ApiError::from(err);
    match (api.status().as_u16(), task_id) {
        (404, Some(id)) => ClientError::NotFound(id),
        (status, _) => ClientError::Server {
            status,
            message: api.message,
        },
    }
}

const ACTOR: ActorId = ActorId(1);

#[async_trait]
impl BoardApi for DbApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.check(&self.calls.list)?;
        self.db.list_active_tasks().map_err(|e| to_client_error(None, e))
    }

    async fn create_task(
        &self,
        request: &CreateTaskRequest,
    ) -> Result<CreateTaskResponse, ClientError> {
        self.check(&self.calls.create)?;
        let task = self
            .db
            .create_task(request, ACTOR, &SoftDeletePolicy::default())
            .map_err(|e| to_client_error(None, e))?;
        Ok(CreateTaskResponse {
            task,
            status: 200,
            message: "Task added successfully!".to_string(),
        })
    }

    async fn update_task(
        &self,
        task_id: i64,
        request: &UpdateTaskRequest,
    ) -> Result<UpdateTaskResponse, ClientError> {
        self.check(&self.calls.update)?;
        let task = self
            .db
            .update_task_description(
                task_id,
                &request.description,
                ACTOR,
                &SoftDeletePolicy::default(),
            )
            .map_err(|e| to_client_error(Some(task_id), e))?;
        Ok(UpdateTaskResponse {
            status: 200,
            message: "Task updated successfully!".to_string(),
            task: Some(task),
        })
    }

    async fn delete_task(&self, task_id: i64) -> Result<MessageResponse, ClientError> {
        self.check(&self.calls.delete)?;
        self.db
            .soft_delete_task(task_id, ACTOR, &SoftDeletePolicy::default())
            .map_err(|e| to_client_error(Some(task_id), e))?;
        Ok(MessageResponse {
            status: 200,
            message: "Task deleted successfully!".to_string(),
        })
    }

    async fn reorder(&self, request: &ReorderRequest) -> Result<ReorderResponse, ClientError> {
        self.check(&self.calls.reorder)?;
        let summary = self
            .db
            .reorder_tasks(request, ACTOR)
            .map_err(|e| to_client_error(None, e))?;
        Ok(ReorderResponse {
            message: "Task updated successfully!".to_string(),
            summary,
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn setup_board() -> (Board<DbApi>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let board = Board::new(DbApi::new()).with_notifier(notifier.clone());
    (board, notifier)
}

async fn add(board: &mut Board<DbApi>, status: Status, description: &str) -> Task {
    board.set_draft(status, description);
    board
        .add_task(status)
        .await
        .expect("add should succeed")
        .expect("non-blank draft should create a task")
}

fn ids(board: &Board<DbApi>, status: Status) -> Vec<i64> {
    board.column(status).tasks.iter().map(|t| t.id).collect()
}

fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn fetch_partitions_by_status() {
        let (mut board, _) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;
        let b = add(&mut board, Status::Done, "b").await;

        board.fetch_tasks().await.unwrap();

        assert_eq!(ids(&board, Status::Todo), vec![a.id]);
        assert!(board.column(Status::InProgress).tasks.is_empty());
        assert_eq!(ids(&board, Status::Done), vec![b.id]);
    }

    #[tokio::test]
    async fn fetching_twice_is_stable() {
        let (mut board, _) = setup_board();
        add(&mut board, Status::Todo, "a").await;
        add(&mut board, Status::Todo, "b").await;
        add(&mut board, Status::InProgress, "c").await;

        board.fetch_tasks().await.unwrap();
        let first = board.columns().to_vec();
        board.fetch_tasks().await.unwrap();

        assert_eq!(board.columns(), first.as_slice());
        assert_eq!(calls(&board.api().calls.list), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_columns() {
        let (mut board, _) = setup_board();
        add(&mut board, Status::Todo, "a").await;
        let before = board.columns().to_vec();

        board.api().fail(true);
        let result = board.fetch_tasks().await;

        assert!(matches!(result, Err(ClientError::Server { status: 500, .. })));
        assert_eq!(board.columns(), before.as_slice());
    }
}

mod add_tests {
    use super::*;

    #[tokio::test]
    async fn blank_draft_sends_no_request() {
        let (mut board, notifier) = setup_board();
        board.set_draft(Status::Todo, "   ");

        let result = board.add_task(Status::Todo).await.unwrap();

        assert!(result.is_none());
        assert_eq!(calls(&board.api().calls.create), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn add_appends_and_resets_input() {
        let (mut board, notifier) = setup_board();
        board.set_adding(Status::InProgress, true);

        let first = add(&mut board, Status::InProgress, "first").await;
        board.set_adding(Status::InProgress, true);
        let second = add(&mut board, Status::InProgress, "second").await;

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(ids(&board, Status::InProgress), vec![first.id, second.id]);
        assert_eq!(board.draft(Status::InProgress), "");
        assert!(!board.is_adding(Status::InProgress));
        assert_eq!(
            notifier.messages(),
            vec!["Task added successfully!", "Task added successfully!"]
        );
    }

    #[tokio::test]
    async fn failed_add_keeps_draft() {
        let (mut board, notifier) = setup_board();
        board.set_adding(Status::Todo, true);
        board.set_draft(Status::Todo, "keep me");
        board.api().fail(true);

        let result = board.add_task(Status::Todo).await;

        assert!(result.is_err());
        assert_eq!(board.draft(Status::Todo), "keep me");
        assert!(board.is_adding(Status::Todo));
        assert!(board.column(Status::Todo).tasks.is_empty());
        assert!(notifier.messages().is_empty());
    }
}

mod edit_tests {
    use super::*;

    #[tokio::test]
    async fn commit_updates_local_description() {
        let (mut board, notifier) = setup_board();
        let task = add(&mut board, Status::Todo, "draft").await;

        assert!(board.edit_task(task.id));
        assert_eq!(board.editing().unwrap().text, "draft");
        board.set_edit_text("final");
        let applied = board.commit_edit().await.unwrap();

        assert!(applied);
        assert!(board.editing().is_none());
        let (_, local) = board.task(task.id).unwrap();
        assert_eq!(local.description, "final");
        assert_eq!(local.updated_by, Some(1));
        assert_eq!(
            notifier.messages().last().map(String::as_str),
            Some("Task updated successfully!")
        );
    }

    #[tokio::test]
    async fn blank_text_cancels_without_request() {
        let (mut board, _) = setup_board();
        let task = add(&mut board, Status::Todo, "keep").await;

        board.edit_task(task.id);
        board.set_edit_text("  ");
        let applied = board.commit_edit().await.unwrap();

        assert!(!applied);
        assert!(board.editing().is_none());
        assert_eq!(calls(&board.api().calls.update), 0);
        assert_eq!(board.task(task.id).unwrap().1.description, "keep");
    }

    #[tokio::test]
    async fn edit_of_unknown_task_is_refused() {
        let (mut board, _) = setup_board();

        assert!(!board.edit_task(404));
        assert!(!board.commit_edit().await.unwrap());
    }

    #[tokio::test]
    async fn failed_commit_keeps_session() {
        let (mut board, _) = setup_board();
        let task = add(&mut board, Status::Todo, "old").await;
        board.edit_task(task.id);
        board.set_edit_text("new");
        board.api().fail(true);

        assert!(board.commit_edit().await.is_err());

        assert_eq!(board.editing().unwrap().text, "new");
        assert_eq!(board.task(task.id).unwrap().1.description, "old");
    }
}

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let (mut board, _) = setup_board();
        let task = add(&mut board, Status::Todo, "stay").await;
        let prompts = Mutex::new(Vec::new());
        let decline = |prompt: &str| {
            prompts.lock().unwrap().push(prompt.to_string());
            false
        };

        let deleted = board.delete_task(task.id, &decline).await.unwrap();

        assert!(!deleted);
        assert_eq!(calls(&board.api().calls.delete), 0);
        assert_eq!(ids(&board, Status::Todo), vec![task.id]);
        assert_eq!(*prompts.lock().unwrap(), vec![DELETE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_task() {
        let (mut board, notifier) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;
        let b = add(&mut board, Status::Todo, "b").await;
        board.edit_task(a.id);

        let deleted = board.delete_task(a.id, &|_: &str| true).await.unwrap();

        assert!(deleted);
        assert_eq!(ids(&board, Status::Todo), vec![b.id]);
        assert!(board.editing().is_none());
        assert_eq!(
            notifier.messages().last().map(String::as_str),
            Some("Task deleted successfully!")
        );

        board.fetch_tasks().await.unwrap();
        assert_eq!(ids(&board, Status::Todo), vec![b.id]);
    }

    #[tokio::test]
    async fn unknown_task_maps_to_not_found() {
        let (mut board, _) = setup_board();

        let result = board.delete_task(999, &|_: &str| true).await;

        assert!(matches!(result, Err(ClientError::NotFound(999))));
    }
}

mod move_tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unknown_task_and_out_of_range_index() {
        let (mut board, _) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;
        add(&mut board, Status::Todo, "b").await;

        assert!(matches!(
            board.move_task(404, Status::Done, 0),
            Err(ClientError::InvalidMove(_))
        ));
        assert!(matches!(
            board.move_task(a.id, Status::Todo, 2),
            Err(ClientError::InvalidMove(_))
        ));
        assert!(matches!(
            board.move_task(a.id, Status::Done, 1),
            Err(ClientError::InvalidMove(_))
        ));
        assert_eq!(ids(&board, Status::Todo)[0], a.id);
    }

    #[tokio::test]
    async fn moves_within_and_across_columns() {
        let (mut board, _) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;
        let b = add(&mut board, Status::Todo, "b").await;
        let c = add(&mut board, Status::Todo, "c").await;

        board.move_task(a.id, Status::Todo, 2).unwrap();
        assert_eq!(ids(&board, Status::Todo), vec![b.id, c.id, a.id]);

        board.move_task(c.id, Status::Done, 0).unwrap();
        assert_eq!(ids(&board, Status::Todo), vec![b.id, a.id]);
        assert_eq!(ids(&board, Status::Done), vec![c.id]);
        assert_eq!(calls(&board.api().calls.reorder), 0);
    }
}

mod persist_tests {
    use super::*;

    #[tokio::test]
    async fn without_drag_sends_nothing() {
        let (mut board, _) = setup_board();
        add(&mut board, Status::Todo, "a").await;

        let sent = board.persist_order().await.unwrap();

        assert!(!sent);
        assert_eq!(calls(&board.api().calls.reorder), 0);
    }

    #[tokio::test]
    async fn renumbers_locally_and_on_server() {
        let (mut board, notifier) = setup_board();
        let a = add(&mut board, Status::Todo, "A").await;
        let b = add(&mut board, Status::Todo, "B").await;
        let c = add(&mut board, Status::Todo, "C").await;

        board.start_drag();
        board.move_task(c.id, Status::InProgress, 0).unwrap();
        board.move_task(a.id, Status::Todo, 1).unwrap();
        let sent = board.persist_order().await.unwrap();

        assert!(sent);
        assert!(!board.is_dragging());
        assert_eq!(
            notifier.messages().last().map(String::as_str),
            Some("Task updated successfully!")
        );
        let placement = |board: &Board<DbApi>, id: i64| {
            let (status, task) = board.task(id).unwrap();
            (status, task.status, task.position)
        };
        assert_eq!(placement(&board, b.id), (Status::Todo, Status::Todo, 0));
        assert_eq!(placement(&board, a.id), (Status::Todo, Status::Todo, 1));
        assert_eq!(
            placement(&board, c.id),
            (Status::InProgress, Status::InProgress, 0)
        );

        board.fetch_tasks().await.unwrap();
        assert_eq!(placement(&board, b.id), (Status::Todo, Status::Todo, 0));
        assert_eq!(placement(&board, a.id), (Status::Todo, Status::Todo, 1));
        assert_eq!(
            placement(&board, c.id),
            (Status::InProgress, Status::InProgress, 0)
        );
    }

    #[tokio::test]
    async fn sends_arrangement_made_through_columns_mut() {
        let (mut board, _) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;
        let b = add(&mut board, Status::Todo, "b").await;

        board.start_drag();
        let columns = board.columns_mut();
        let task = columns[Status::Todo.index()].tasks.remove(0);
        columns[Status::Done.index()].tasks.push(task);
        board.persist_order().await.unwrap();

        let stored = board.api().db.get_task(a.id, false).unwrap().unwrap();
        assert_eq!((stored.status, stored.position), (Status::Done, 0));
        let stored = board.api().db.get_task(b.id, false).unwrap().unwrap();
        assert_eq!((stored.status, stored.position), (Status::Todo, 0));
        assert_eq!(board.task(a.id).unwrap().1.status, Status::Done);
    }

    #[tokio::test]
    async fn failure_still_clears_drag_flag() {
        let (mut board, _) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;

        board.start_drag();
        board.move_task(a.id, Status::Done, 0).unwrap();
        board.api().fail(true);
        let result = board.persist_order().await;

        assert!(result.is_err());
        assert!(!board.is_dragging());
        // the local move stays; the next fetch brings back the server's order
        assert_eq!(ids(&board, Status::Done), vec![a.id]);
        board.api().fail(false);
        board.fetch_tasks().await.unwrap();
        assert_eq!(ids(&board, Status::Todo), vec![a.id]);
    }

    #[tokio::test]
    async fn drops_tasks_deleted_elsewhere() {
        let (mut board, _) = setup_board();
        let a = add(&mut board, Status::Todo, "a").await;
        let b = add(&mut board, Status::Todo, "b").await;
        board
            .api()
            .db
            .soft_delete_task(a.id, ActorId(2), &SoftDeletePolicy::default())
            .unwrap();

        board.start_drag();
        board.move_task(b.id, Status::Todo, 0).unwrap();
        board.persist_order().await.unwrap();

        assert!(board.task(a.id).is_none());
        let (_, remaining) = board.task(b.id).unwrap();
        assert_eq!(remaining.position, 0);
    }
}
