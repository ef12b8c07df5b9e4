use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::routes::{admin, chat, health};
use parcelchat_types::{
    AdminReplyRequest, AdminReplyResponse, DeleteThreadResponse, ErrorBody, FieldError,
    MessageListResponse, MessageView, PostMessageRequest, PostMessageResponse, Sender,
    StatusUpdateRequest, StatusUpdateResponse, ThreadDetailResponse, ThreadListResponse,
    ThreadStatus, ThreadView,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        chat::post_message,
        chat::get_messages,
        chat::close_thread,
        admin::list_threads,
        admin::get_thread,
        admin::reply,
        admin::set_status,
        admin::delete_thread,
    ),
    components(schemas(
        health::HealthResponse,
        PostMessageRequest,
        PostMessageResponse,
        MessageView,
        MessageListResponse,
        StatusUpdateRequest,
        StatusUpdateResponse,
        ThreadView,
        ThreadListResponse,
        ThreadDetailResponse,
        AdminReplyRequest,
        AdminReplyResponse,
        DeleteThreadResponse,
        ErrorBody,
        FieldError,
        Sender,
        ThreadStatus,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service status"),
        (name = "chat", description = "Customer chat widget"),
        (name = "admin", description = "Admin chat console")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// OpenAPI document for the chat API
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
