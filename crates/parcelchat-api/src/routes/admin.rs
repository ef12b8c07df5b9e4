//! Admin console routes. Every handler requires an ADMIN bearer token.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use parcelchat_core::ChatError;
use parcelchat_persist::ThreadFilter;
use parcelchat_types::{
    AdminReplyRequest, AdminReplyResponse, DeleteThreadResponse, ErrorBody, StatusUpdateRequest,
    StatusUpdateResponse, ThreadDetailResponse, ThreadListResponse, ThreadStatus,
};

use crate::{auth::Caller, error::ApiResult, state::AppState, views};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListThreadsQuery {
    /// `open` or `closed`; all threads when absent
    pub status: Option<String>,
    /// Maximum number of threads (default 50, capped at 200)
    pub limit: Option<i64>,
}

impl ListThreadsQuery {
    fn filter(&self) -> Result<ThreadFilter, ChatError> {
        let mut filter = ThreadFilter::new();
        if let Some(status) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            let status: ThreadStatus = status
                .parse()
                .map_err(|_| ChatError::invalid("status", "must be open or closed"))?;
            filter = filter.status(status);
        }
        if let Some(limit) = self.limit {
            filter = filter.limit(limit);
        }
        Ok(filter)
    }
}

/// List threads, most recently active first
#[utoipa::path(
    get,
    path = "/admin/chat/threads",
    params(ListThreadsQuery),
    responses(
        (status = 200, description = "Threads", body = ThreadListResponse),
        (status = 400, description = "Invalid filter", body = ErrorBody),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    query: Result<Query<ListThreadsQuery>, QueryRejection>,
) -> ApiResult<Json<ThreadListResponse>> {
    actor.require_admin()?;
    let Query(query) = query?;

    let threads = state.lifecycle.list_threads(&actor, query.filter()?).await?;
    let format = state.timestamp_format();
    Ok(Json(ThreadListResponse {
        threads: threads.into_iter().map(|t| views::thread_view(t, format)).collect(),
    }))
}

/// Thread contact, status and messages
#[utoipa::path(
    get,
    path = "/admin/chat/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread with messages", body = ThreadDetailResponse),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadDetailResponse>> {
    actor.require_admin()?;

    let thread = state.lifecycle.get_thread(&thread_id).await?;
    let messages = state.lifecycle.messages(&thread_id).await?;
    let format = state.timestamp_format();
    Ok(Json(ThreadDetailResponse {
        thread: views::thread_view(thread, format),
        messages: views::message_views(messages, format),
    }))
}

/// Reply as ADMIN. Closed threads accept replies.
#[utoipa::path(
    post,
    path = "/admin/chat/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = AdminReplyRequest,
    responses(
        (status = 201, description = "Reply stored", body = AdminReplyResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn reply(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(thread_id): Path<String>,
    payload: Result<Json<AdminReplyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminReplyResponse>)> {
    actor.require_admin()?;
    let Json(req) = payload?;

    let message = state
        .ingestion
        .post_admin_reply(&actor, &thread_id, &req.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminReplyResponse {
            message: "Reply sent".to_string(),
            id: message.id,
        }),
    ))
}

/// Close or reopen a thread
#[utoipa::path(
    patch,
    path = "/admin/chat/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusUpdateResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(thread_id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    actor.require_admin()?;
    let Json(req) = payload?;

    let thread = state.lifecycle.set_status(&thread_id, req.requested()).await?;
    tracing::info!(thread_id = %thread_id, status = %thread.status, "Thread status set by admin");
    Ok(Json(StatusUpdateResponse {
        message: "Thread status updated".to_string(),
        status: thread.status,
    }))
}

/// Delete a thread and all of its messages
#[utoipa::path(
    delete,
    path = "/admin/chat/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread deleted", body = DeleteThreadResponse),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "Thread not found", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Caller(actor): Caller,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<DeleteThreadResponse>> {
    state.lifecycle.delete_thread(&actor, &thread_id).await?;
    Ok(Json(DeleteThreadResponse {
        message: "Thread deleted".to_string(),
    }))
}
