pub mod auth;
pub mod config;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::logging;
use crate::routes::{admin, chat, health};
use crate::state::AppState;

/// Full application router: public chat routes, admin routes, health and docs
pub fn build_router(state: Arc<AppState>) -> Router {
    let chat_routes = Router::new()
        .route("/webhook", post(chat::post_message))
        .route(
            "/threads/:thread_id",
            get(chat::get_messages).patch(chat::close_thread),
        );

    let admin_routes = Router::new()
        .route("/threads", get(admin::list_threads))
        .route(
            "/threads/:thread_id",
            get(admin::get_thread)
                .post(admin::reply)
                .patch(admin::set_status)
                .delete(admin::delete_thread),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/openapi.json", get(docs::openapi_json))
        .nest("/chat", chat_routes)
        .nest("/admin/chat", admin_routes)
        .layer(axum_middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
