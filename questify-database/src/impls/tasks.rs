use anyhow::Context as _;

use questify_utils::time::now_unix_secs;

use crate::{
    database::Database,
    model::task::{Task, TaskFields},
};

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    kind: String,
    due_at: Option<String>,
    is_active: bool,
}

pub async fn list_tasks(db: &Database, user_id: i64) -> anyhow::Result<Vec<Task>> {
    let rows: Vec<TaskRow> = sqlx::query_as(
        "SELECT id, user_id, title, kind, due_at, is_active
         FROM tasks
         WHERE user_id = $1
         ORDER BY id ASC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_task).collect()
}

pub async fn create_task(db: &Database, user_id: i64, fields: &TaskFields) -> anyhow::Result<Task> {
    let created_at = i64::try_from(now_unix_secs()).context("created_at out of i64 range")?;

    let row: TaskRow = sqlx::query_as(
        "INSERT INTO tasks (user_id, title, kind, due_at, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, user_id, title, kind, due_at, is_active",
    )
    .bind(user_id)
    .bind(&fields.title)
    .bind(fields.kind.as_str())
    .bind(fields.due_at.as_deref())
    .bind(fields.is_active)
    .bind(created_at)
    .fetch_one(db.pool())
    .await?;

    to_task(row)
}

/// Replace a task's fields. Returns `None` when the task does not belong to the user.
pub async fn update_task(
    db: &Database,
    user_id: i64,
    task_id: i64,
    fields: &TaskFields,
) -> anyhow::Result<Option<Task>> {
    let row: Option<TaskRow> = sqlx::query_as(
        "UPDATE tasks
         SET title = $1, kind = $2, due_at = $3, is_active = $4
         WHERE id = $5 AND user_id = $6
         RETURNING id, user_id, title, kind, due_at, is_active",
    )
    .bind(&fields.title)
    .bind(fields.kind.as_str())
    .bind(fields.due_at.as_deref())
    .bind(fields.is_active)
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_task).transpose()
}

pub async fn delete_task(db: &Database, user_id: i64, task_id: i64) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

fn to_task(row: TaskRow) -> anyhow::Result<Task> {
    Ok(Task {
        id: row.id,
        user_id: row.user_id,
        title: row.title,
        kind: row.kind.parse().context("task kind row is invalid")?,
        due_at: row.due_at,
        is_active: row.is_active,
    })
}
