#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use parcelchat_api::{build_router, config::Config, state::AppState};
use parcelchat_persist::InMemoryPersistenceClient;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";

pub fn test_config(closed_thread_policy: &str) -> Config {
    let toml = format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [cors]
        enabled = true
        origins = ["*"]

        [chat]
        closed_thread_policy = "{closed_thread_policy}"

        [auth]
        admin_tokens = ["{ADMIN_TOKEN}"]
        user_tokens = ["{USER_TOKEN}"]

        [logging]
        level = "debug"
        format = "pretty"
        "#
    );
    toml::from_str(&toml).unwrap()
}

pub fn app() -> Router {
    app_with_policy("accept")
}

pub fn app_with_policy(closed_thread_policy: &str) -> Router {
    let store = Arc::new(InMemoryPersistenceClient::new());
    build_router(Arc::new(AppState::new(test_config(closed_thread_policy), store)))
}

pub fn nika(message: &str) -> Value {
    json!({
        "firstName": "Nika",
        "lastName": "Beridze",
        "email": "n@x.com",
        "phone": "555000111",
        "message": message,
    })
}

pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Open a thread through the customer webhook and return its id
pub async fn open_thread(app: &Router, message: &str) -> String {
    let (status, body) = call(app, Method::POST, "/chat/webhook", None, Some(nika(message))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["threadId"].as_str().unwrap().to_string()
}

pub fn texts(messages: &Value) -> Vec<(String, String)> {
    messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["sender"].as_str().unwrap().to_string(),
                m["text"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}
