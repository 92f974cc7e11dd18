//! Integration tests for the owner-scoped todo endpoints
//!
//! Run against a real database:
//!   TEST_DATABASE_URL=... cargo test -- --ignored

mod common;

use axum::http::StatusCode;
use common::{unique_email, TestApp};
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_and_list_todos() {
    let app = TestApp::new().await;
    let user = app
        .signup_user("Ann", &unique_email("todos"), "secret123")
        .await;

    let body = json!({ "title": "Buy milk", "priority": "high" });
    let created = app
        .send(
            "POST",
            "/api/v1/todos",
            Some(&body.to_string()),
            Some(&user.access_token),
            None,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let todo = created.json();
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["status"], "pending");
    assert_eq!(todo["priority"], "high");
    assert!(todo.get("userId").is_none());

    let list = app
        .send("GET", "/api/v1/todos", None, Some(&user.access_token), None)
        .await;
    assert_eq!(list.status, StatusCode::OK);

    let json = list.json();
    assert_eq!(json["results"], 1);
    assert_eq!(json["todos"][0]["id"], todo["id"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_todo_rejects_short_title() {
    let app = TestApp::new().await;
    let user = app
        .signup_user("Ann", &unique_email("short"), "secret123")
        .await;

    let body = json!({ "title": "ab" });
    let response = app
        .send(
            "POST",
            "/api/v1/todos",
            Some(&body.to_string()),
            Some(&user.access_token),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Task name must be at least 3 characters"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_patches_only_provided_fields() {
    let app = TestApp::new().await;
    let user = app
        .signup_user("Ann", &unique_email("patch"), "secret123")
        .await;

    let body = json!({ "title": "Write report", "description": "for Monday" });
    let created = app
        .send(
            "POST",
            "/api/v1/todos",
            Some(&body.to_string()),
            Some(&user.access_token),
            None,
        )
        .await;
    let id = created.json()["id"].as_str().unwrap().to_string();

    let patch = json!({ "status": "completed" });
    let updated = app
        .send(
            "PATCH",
            &format!("/api/v1/todos/{}", id),
            Some(&patch.to_string()),
            Some(&user.access_token),
            None,
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    let todo = updated.json();
    assert_eq!(todo["status"], "completed");
    // Untouched fields survive the patch
    assert_eq!(todo["title"], "Write report");
    assert_eq!(todo["description"], "for Monday");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_todos_are_invisible_to_other_users() {
    let app = TestApp::new().await;
    let owner = app
        .signup_user("Ann", &unique_email("owner"), "secret123")
        .await;
    let stranger = app
        .signup_user("Bob", &unique_email("stranger"), "secret123")
        .await;

    let body = json!({ "title": "Private task" });
    let created = app
        .send(
            "POST",
            "/api/v1/todos",
            Some(&body.to_string()),
            Some(&owner.access_token),
            None,
        )
        .await;
    let id = created.json()["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/todos/{}", id);

    // Reads, patches and deletes against someone else's todo all 404
    let read = app
        .send("GET", &path, None, Some(&stranger.access_token), None)
        .await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);

    let patch = json!({ "status": "completed" });
    let update = app
        .send(
            "PATCH",
            &path,
            Some(&patch.to_string()),
            Some(&stranger.access_token),
            None,
        )
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = app
        .send("DELETE", &path, None, Some(&stranger.access_token), None)
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    // The owner still sees it
    let read = app
        .send("GET", &path, None, Some(&owner.access_token), None)
        .await;
    assert_eq!(read.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_todo_returns_no_content() {
    let app = TestApp::new().await;
    let user = app
        .signup_user("Ann", &unique_email("delete"), "secret123")
        .await;

    let body = json!({ "title": "Throw away" });
    let created = app
        .send(
            "POST",
            "/api/v1/todos",
            Some(&body.to_string()),
            Some(&user.access_token),
            None,
        )
        .await;
    let id = created.json()["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/todos/{}", id);

    let deleted = app
        .send("DELETE", &path, None, Some(&user.access_token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .send("GET", &path, None, Some(&user.access_token), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
