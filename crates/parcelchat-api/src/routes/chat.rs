//! Public customer routes. No authentication; the thread id is the capability.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;

use parcelchat_core::{ChatError, CustomerMessage};
use parcelchat_types::{
    ErrorBody, MessageListResponse, PostMessageRequest, PostMessageResponse, StatusUpdateRequest,
    StatusUpdateResponse, ThreadStatus,
};

use crate::{error::ApiResult, state::AppState, views};

/// Post a customer message
///
/// Without `threadId` a new thread is opened from the contact fields.
#[utoipa::path(
    post,
    path = "/chat/webhook",
    request_body = PostMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = PostMessageResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    tag = "chat"
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> ApiResult<Json<PostMessageResponse>> {
    let Json(req) = payload?;
    let posted = state
        .ingestion
        .post_customer_message(CustomerMessage::from(req))
        .await?;

    Ok(Json(PostMessageResponse {
        thread_id: posted.thread_id,
        message_id: posted.message_id,
        status: "ok".to_string(),
    }))
}

/// Messages of a thread, oldest first
#[utoipa::path(
    get,
    path = "/chat/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread messages", body = MessageListResponse),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    tag = "chat"
)]
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<MessageListResponse>> {
    let messages = state.lifecycle.messages(&thread_id).await?;
    Ok(Json(MessageListResponse {
        messages: views::message_views(messages, state.timestamp_format()),
    }))
}

/// Close a thread from the customer side. Closing twice succeeds.
#[utoipa::path(
    patch,
    path = "/chat/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Thread closed", body = StatusUpdateResponse),
        (status = 400, description = "Only closing is allowed", body = ErrorBody),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    tag = "chat"
)]
pub async fn close_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let Json(req) = payload?;
    if req.requested() != ThreadStatus::Closed {
        return Err(ChatError::invalid("status", "customers can only close a thread").into());
    }

    let thread = state.lifecycle.set_status(&thread_id, ThreadStatus::Closed).await?;
    Ok(Json(StatusUpdateResponse {
        message: "Thread status updated".to_string(),
        status: thread.status,
    }))
}
