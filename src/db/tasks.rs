//! Task CRUD and reorder operations.

use super::{Database, now_ms};
use crate::config::SoftDeletePolicy;
use crate::error::ApiError;
use crate::types::{
    ActorId, CreateTaskRequest, ReorderRequest, ReorderSummary, Status, Task, validate_description,
};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashSet;
use tracing::{debug, info};

const TASK_COLUMNS: &str = "id, description, status, position, created_by, updated_by, \
     deleted_by, created_at, updated_at, deleted_at";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status_id: i64 = row.get("status")?;
    let status = Status::from_id(status_id)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, status_id))?;

    Ok(Task {
        id: row.get("id")?,
        description: row.get("description")?,
        status,
        position: row.get("position")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
        deleted_by: row.get("deleted_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: i64, include_deleted: bool) -> Result<Option<Task>> {
    let sql = if include_deleted {
        format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS)
    } else {
        format!(
            "SELECT {} FROM tasks WHERE id = ?1 AND deleted_at IS NULL",
            TASK_COLUMNS
        )
    };
    let task = conn
        .query_row(&sql, params![task_id], parse_task_row)
        .optional()?;
    Ok(task)
}

/// Next free position in a column: one past the current maximum, or 0.
fn next_position_internal(conn: &Connection, status: Status, count_deleted: bool) -> Result<i64> {
    let sql = if count_deleted {
        "SELECT MAX(position) FROM tasks WHERE status = ?1"
    } else {
        "SELECT MAX(position) FROM tasks WHERE status = ?1 AND deleted_at IS NULL"
    };
    let max: Option<i64> = conn.query_row(sql, params![status.id()], |row| row.get(0))?;
    Ok(max.map_or(0, |p| p + 1))
}

fn check_description(description: &str) -> Result<()> {
    validate_description(description)
        .map_err(|reason| ApiError::invalid_value("description", reason).into())
}

impl Database {
    /// List every task that has not been soft-deleted, by column then position.
    pub fn list_active_tasks(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM tasks WHERE deleted_at IS NULL
                 ORDER BY status, position, id",
                TASK_COLUMNS
            ))?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Get a task by id. Soft-deleted rows are returned only when asked for.
    pub fn get_task(&self, task_id: i64, include_deleted: bool) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id, include_deleted))
    }

    /// Position the next task created in `status` would get.
    pub fn next_position(&self, status: Status, policy: &SoftDeletePolicy) -> Result<i64> {
        self.with_conn(|conn| next_position_internal(conn, status, policy.count_deleted_positions))
    }

    /// Create a task at the end of its column.
    pub fn create_task(
        &self,
        request: &CreateTaskRequest,
        actor: ActorId,
        policy: &SoftDeletePolicy,
    ) -> Result<Task> {
        check_description(&request.description)?;
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let position =
                next_position_internal(&tx, request.status, policy.count_deleted_positions)?;

            tx.execute(
                "INSERT INTO tasks (
                    description, status, position, created_by, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &request.description,
                    request.status.id(),
                    position,
                    actor.0,
                    now,
                    now,
                ],
            )?;
            let task_id = tx.last_insert_rowid();

            let task = get_task_internal(&tx, task_id, true)?
                .ok_or_else(|| ApiError::internal("created task vanished"))?;

            tx.commit()?;

            info!(task_id, status = %task.status, position, actor = %actor, "Task created");
            Ok(task)
        })
    }

    /// Replace a task's description.
    pub fn update_task_description(
        &self,
        task_id: i64,
        description: &str,
        actor: ActorId,
        policy: &SoftDeletePolicy,
    ) -> Result<Task> {
        check_description(description)?;
        let now = now_ms();

        self.with_conn(|conn| {
            if get_task_internal(conn, task_id, policy.match_deleted_by_id)?.is_none() {
                return Err(ApiError::task_not_found(task_id).into());
            }

            conn.execute(
                "UPDATE tasks SET description = ?1, updated_by = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![description, actor.0, now, task_id],
            )?;

            let task = get_task_internal(conn, task_id, true)?
                .ok_or_else(|| ApiError::task_not_found(task_id))?;

            info!(task_id, actor = %actor, "Task description updated");
            Ok(task)
        })
    }

    /// Soft-delete a task. The row is kept with `deleted_by`/`deleted_at` set.
    ///
    /// A row that is already deleted is returned unchanged.
    pub fn soft_delete_task(
        &self,
        task_id: i64,
        actor: ActorId,
        policy: &SoftDeletePolicy,
    ) -> Result<Task> {
        let now = now_ms();

        self.with_conn(|conn| {
            let task = get_task_internal(conn, task_id, policy.match_deleted_by_id)?
                .ok_or_else(|| ApiError::task_not_found(task_id))?;

            if task.is_deleted() {
                debug!(task_id, "Task already deleted");
                return Ok(task);
            }

            conn.execute(
                "UPDATE tasks SET deleted_by = ?1, deleted_at = ?2 WHERE id = ?3",
                params![actor.0, now, task_id],
            )?;

            let task = get_task_internal(conn, task_id, true)?
                .ok_or_else(|| ApiError::task_not_found(task_id))?;

            info!(task_id, actor = %actor, "Task deleted");
            Ok(task)
        })
    }

    /// Rewrite status and position of every listed task.
    ///
    /// Each task moves to its column with `position` equal to its index in
    /// that column's list. The batch runs in one transaction. Ids that match
    /// no active row are skipped, reported in the summary, and take no
    /// position, so each column stays dense. A column or task listed twice
    /// rejects the whole batch.
    pub fn reorder_tasks(&self, request: &ReorderRequest, actor: ActorId) -> Result<ReorderSummary> {
        let mut columns = HashSet::new();
        for column in &request.columns {
            if !columns.insert(column.id) {
                return Err(ApiError::invalid_value(
                    "columns",
                    format!("column {} is listed more than once", column.id),
                )
                .into());
            }
        }

        let mut seen = HashSet::new();
        for task in request.columns.iter().flat_map(|c| c.tasks.iter()) {
            if !seen.insert(task.id) {
                return Err(ApiError::invalid_value(
                    "columns",
                    format!("task {} is listed more than once", task.id),
                )
                .into());
            }
        }

        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut summary = ReorderSummary::default();

            {
                let mut stmt = tx.prepare(
                    "UPDATE tasks SET status = ?1, position = ?2, updated_by = ?3, updated_at = ?4
                     WHERE id = ?5 AND deleted_at IS NULL",
                )?;

                for column in &request.columns {
                    let mut position: i64 = 0;
                    for task in &column.tasks {
                        let changed =
                            stmt.execute(params![column.id.id(), position, actor.0, now, task.id])?;
                        if changed == 0 {
                            summary.skipped.push(task.id);
                        } else {
                            summary.updated += changed;
                            position += 1;
                        }
                    }
                }
            }

            tx.commit()?;

            info!(
                updated = summary.updated,
                skipped = summary.skipped.len(),
                actor = %actor,
                "Tasks reordered"
            );
            Ok(summary)
        })
    }
}
