use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use task_manager_server::task::memory::InMemoryTaskStore;
use task_manager_server::task::web::TaskState;
use task_manager_server::web::create_router;
use tower::ServiceExt;

/// Builds the full application router over a fresh in-memory store.
fn setup_app() -> Router {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    create_router(TaskState {
        store: Arc::new(InMemoryTaskStore::new()),
    })
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates a task through the API and returns its JSON representation.
async fn create_task(app: &Router, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/tasks", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

#[tokio::test]
async fn can_create_task_with_only_title() {
    let app = setup_app();
    let before = chrono::Utc::now();

    let task = create_task(&app, json!({"title": "Write report"})).await;

    assert_eq!(task["id"], 1);
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["description"], Value::Null);
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["completed"], false);

    let created_at = chrono::DateTime::parse_from_rfc3339(task["created_at"].as_str().unwrap())
        .unwrap()
        .with_timezone(&chrono::Utc);
    assert!(created_at >= before);
}

#[tokio::test]
async fn can_list_created_tasks_with_submitted_fields() {
    let app = setup_app();
    create_task(
        &app,
        json!({"title": "Water plants", "description": "Both balconies", "priority": "low"}),
    )
    .await;
    create_task(&app, json!({"title": "File taxes"})).await;

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/tasks"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tasks = response_json(response).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["id"], 1);
    assert_eq!(tasks[0]["title"], "Water plants");
    assert_eq!(tasks[0]["description"], "Both balconies");
    assert_eq!(tasks[0]["priority"], "low");
    assert_eq!(tasks[1]["id"], 2);
    assert_eq!(tasks[1]["title"], "File taxes");
}

#[tokio::test]
async fn can_update_task_fields_without_touching_completion() {
    let app = setup_app();
    let task = create_task(&app, json!({"title": "Draft", "priority": "low"})).await;
    let id = task["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/task/{id}"),
            json!({"title": "Final", "description": "Ready for review", "priority": "high"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = response_json(response).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["description"], "Ready for review");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["completed"], false);
    assert_eq!(updated["created_at"], task["created_at"]);
}

#[tokio::test]
async fn can_return_not_found_when_updating_nonexistent_task() {
    let app = setup_app();
    create_task(&app, json!({"title": "Only task"})).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/task/99",
            json!({"title": "Ghost"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = response_json(response).await;
    assert_eq!(error["message"], "Task not found");

    // The collection is unchanged.
    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/tasks"))
        .await
        .unwrap();
    let tasks = response_json(response).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Only task");
}

#[tokio::test]
async fn can_toggle_completion_twice_back_to_original() {
    let app = setup_app();
    let task = create_task(&app, json!({"title": "Toggle me"})).await;
    let id = task["id"].as_i64().unwrap();
    let uri = format!("/tasks/{id}/complete");

    let response = app
        .clone()
        .oneshot(empty_request(Method::PATCH, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let toggled = response_json(response).await;
    assert_eq!(toggled["completed"], true);

    let response = app
        .clone()
        .oneshot(empty_request(Method::PATCH, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let toggled_again = response_json(response).await;
    assert_eq!(toggled_again["completed"], false);
}

#[tokio::test]
async fn can_return_not_found_when_toggling_nonexistent_task() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::PATCH, "/tasks/5/complete"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = response_json(response).await;
    assert_eq!(error["message"], "Task not found");
}

#[tokio::test]
async fn can_delete_task_and_reject_further_operations_on_its_id() {
    let app = setup_app();
    let task = create_task(&app, json!({"title": "Delete me"})).await;
    let id = task["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &format!("/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Task deleted successfully");

    // Update, toggle, and delete on the removed ID all report 404.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/task/{id}"),
            json!({"title": "Too late"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request(Method::PATCH, &format!("/tasks/{id}/complete")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &format!("/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn can_assign_fresh_ids_after_deletion() {
    let app = setup_app();
    let first = create_task(&app, json!({"title": "First"})).await;

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/tasks/{}", first["id"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let second = create_task(&app, json!({"title": "Second"})).await;
    assert_eq!(second["id"], 2);
}

#[tokio::test]
async fn can_reject_create_without_title_and_insert_nothing() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/tasks",
            json!({"description": "No title here"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error = response_json(response).await;
    assert_eq!(error["error"], "VALIDATION_ERROR");
    assert_eq!(error["message"], "Field 'title' is required");

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/tasks"))
        .await
        .unwrap();
    let tasks = response_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn can_reject_create_with_malformed_body() {
    let app = setup_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/tasks")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = response_json(response).await;
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn can_report_liveness_message_at_root() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Task Manager API is running!");
}

#[tokio::test]
async fn can_report_health_payload() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api-docs/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let document = response_json(response).await;
    assert!(document["paths"]["/tasks"].is_object());
    assert!(document["paths"]["/task/{id}"].is_object());
}
