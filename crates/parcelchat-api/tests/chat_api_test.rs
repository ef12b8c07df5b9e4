mod common;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::json;

use common::{app, app_with_policy, call, nika, open_thread, texts, ADMIN_TOKEN};

#[tokio::test]
async fn test_first_message_opens_thread() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/chat/webhook", None, Some(nika("Hello"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["messageId"].as_str().is_some_and(|id| !id.is_empty()));
    let thread_id = body["threadId"].as_str().unwrap();

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/admin/chat/threads/{thread_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&body["messages"]), vec![("USER".to_string(), "Hello".to_string())]);
    assert_eq!(body["thread"]["firstName"], "Nika");
    assert_eq!(body["thread"]["lastName"], "Beridze");
    assert_eq!(body["thread"]["status"], "open");
}

#[tokio::test]
async fn test_messages_carry_display_and_iso_timestamps() {
    let app = app();
    let thread_id = open_thread(&app, "Hello").await;

    let (status, body) = call(&app, Method::GET, &format!("/chat/threads/{thread_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let message = &body["messages"][0];
    let iso: DateTime<Utc> = message["createdAtIso"].as_str().unwrap().parse().unwrap();
    let display = message["createdAt"].as_str().unwrap();
    assert_eq!(
        display,
        iso.with_timezone(&chrono::Local).format("%d.%m.%Y, %H:%M:%S").to_string()
    );
}

#[tokio::test]
async fn test_sequential_posts_keep_call_order() {
    let app = app();
    let thread_id = open_thread(&app, "message 0").await;

    for i in 1..20 {
        let (status, _) = call(
            &app,
            Method::POST,
            "/chat/webhook",
            None,
            Some(json!({ "threadId": thread_id, "message": format!("message {i}") })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = call(&app, Method::GET, &format!("/chat/threads/{thread_id}"), None, None).await;
    let got: Vec<String> = texts(&body["messages"]).into_iter().map(|(_, text)| text).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("message {i}")).collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn test_validation_errors_list_every_field() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/chat/webhook",
        None,
        Some(json!({ "email": "not-an-email", "phone": "12", "message": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["message", "firstName", "lastName", "email", "phone"]);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/chat/webhook")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_thread_is_not_found() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/chat/threads/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());

    let (status, _) = call(
        &app,
        Method::POST,
        "/chat/webhook",
        None,
        Some(json!({ "threadId": "does-not-exist", "message": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/chat/threads/does-not-exist",
        None,
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_double_close_returns_ok_both_times() {
    let app = app();
    let thread_id = open_thread(&app, "Hello").await;
    let uri = format!("/chat/threads/{thread_id}");

    for _ in 0..2 {
        let (status, body) = call(&app, Method::PATCH, &uri, None, Some(json!({ "status": "closed" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "closed");
    }

    // Status field defaults to closed
    let (status, body) = call(&app, Method::PATCH, &uri, None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
}

#[tokio::test]
async fn test_customer_cannot_reopen() {
    let app = app();
    let thread_id = open_thread(&app, "Hello").await;

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/chat/threads/{thread_id}"),
        None,
        Some(json!({ "status": "open" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "status");
}

#[tokio::test]
async fn test_closed_thread_accepts_messages_by_default() {
    let app = app();
    let thread_id = open_thread(&app, "Hello").await;
    call(&app, Method::PATCH, &format!("/chat/threads/{thread_id}"), None, Some(json!({ "status": "closed" }))).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/chat/webhook",
        None,
        Some(json!({ "threadId": thread_id, "message": "One more thing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/admin/chat/threads/{thread_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(body["thread"]["status"], "closed");
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_closed_thread_rejects_messages_when_configured() {
    let app = app_with_policy("reject");
    let thread_id = open_thread(&app, "Hello").await;
    call(&app, Method::PATCH, &format!("/chat/threads/{thread_id}"), None, Some(json!({ "status": "closed" }))).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/chat/webhook",
        None,
        Some(json!({ "threadId": thread_id, "message": "One more thing" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "threadId");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["memory"], "connected");

    let (status, body) = call(&app, Method::GET, "/api/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/chat/webhook"].is_object());
    assert!(body["paths"]["/admin/chat/threads/{thread_id}"].is_object());
}
