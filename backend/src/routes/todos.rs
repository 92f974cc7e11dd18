//! Todo routes
//!
//! Every route in this module sits behind the auth gate; handlers only
//! ever see todos owned by the resolved user. A todo belonging to
//! someone else answers 404, same as one that does not exist.

use crate::auth::{self, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{NewTodo, TodoPriority, TodoRecord, TodoRepository, TodoStatus, UpdateTodo};
use crate::state::AppState;
use crate::validation::ValidatedJson;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create todo routes, all behind `protect`
pub fn todo_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route(
            "/:id",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::protect))
}

/// Create todo request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[validate(length(min = 3, message = "Task name must be at least 3 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Update todo request body; every field optional
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[validate(length(min = 3, message = "Task name must be at least 3 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// List response with a result count
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub results: usize,
    pub todos: Vec<TodoRecord>,
}

const NOT_FOUND: &str = "No todo found with that ID belonging to you";

/// GET /api/v1/todos
async fn list_todos(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<TodoListResponse>> {
    let todos = TodoRepository::list_for_user(state.db(), user.id).await?;
    Ok(Json(TodoListResponse {
        results: todos.len(),
        todos,
    }))
}

/// POST /api/v1/todos
async fn create_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoRecord>)> {
    let new_todo = NewTodo {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        due_date: req.due_date,
    };

    let todo = TodoRepository::create(state.db(), user.id, &new_todo).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /api/v1/todos/:id
async fn get_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TodoRecord>> {
    let todo = TodoRepository::find_for_user(state.db(), id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Json(todo))
}

/// PATCH /api/v1/todos/:id
async fn update_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTodoRequest>,
) -> ApiResult<Json<TodoRecord>> {
    let updates = UpdateTodo {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        due_date: req.due_date,
    };

    let todo = TodoRepository::update_for_user(state.db(), id, user.id, &updates)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Json(todo))
}

/// DELETE /api/v1/todos/:id
async fn delete_todo(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = TodoRepository::delete_for_user(state.db(), id, user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
