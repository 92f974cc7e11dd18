//! Todo repository for database operations
//!
//! All access is scoped by owner: a todo that exists but belongs to
//! another user is indistinguishable from one that does not exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Todo completion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_status")]
pub enum TodoStatus {
    #[sqlx(rename = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sqlx(rename = "completed")]
    #[serde(rename = "completed")]
    Completed,
}

/// Todo priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

/// Todo record from database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a todo
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a todo; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Todo repository for database operations
pub struct TodoRepository;

impl TodoRepository {
    /// List all todos belonging to a user, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<TodoRecord>> {
        sqlx::query_as::<_, TodoRecord>(
            r#"
            SELECT id, user_id, title, description, status, priority,
                   due_date, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Find a todo by id, scoped to its owner
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Option<TodoRecord>> {
        sqlx::query_as::<_, TodoRecord>(
            r#"
            SELECT id, user_id, title, description, status, priority,
                   due_date, created_at, updated_at
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Create a todo owned by a user
    pub async fn create(pool: &PgPool, user_id: Uuid, todo: &NewTodo) -> sqlx::Result<TodoRecord> {
        sqlx::query_as::<_, TodoRecord>(
            r#"
            INSERT INTO todos (user_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, COALESCE($4, 'pending'::todo_status),
                    COALESCE($5, 'medium'::todo_priority), $6)
            RETURNING id, user_id, title, description, status, priority,
                      due_date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.status)
        .bind(todo.priority)
        .bind(todo.due_date)
        .fetch_one(pool)
        .await
    }

    /// Patch a todo, scoped to its owner
    pub async fn update_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        updates: &UpdateTodo,
    ) -> sqlx::Result<Option<TodoRecord>> {
        sqlx::query_as::<_, TodoRecord>(
            r#"
            UPDATE todos SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                due_date = COALESCE($7, due_date),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, status, priority,
                      due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&updates.title)
        .bind(&updates.description)
        .bind(updates.status)
        .bind(updates.priority)
        .bind(updates.due_date)
        .fetch_optional(pool)
        .await
    }

    /// Delete a todo, scoped to its owner; returns whether a row was removed
    pub async fn delete_for_user(pool: &PgPool, id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
