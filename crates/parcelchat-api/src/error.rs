use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parcelchat_core::ChatError;
use parcelchat_types::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Chat(ChatError::Validation(fields)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Validation failed".to_string(),
                    fields: Some(fields),
                },
            ),
            ApiError::Chat(ChatError::Transient(ref e)) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, message("Storage error"))
            }
            ApiError::Chat(ref e) => {
                let status = match e {
                    ChatError::Unauthorized => StatusCode::UNAUTHORIZED,
                    ChatError::Forbidden => StatusCode::FORBIDDEN,
                    _ => StatusCode::NOT_FOUND,
                };
                (status, message(e.to_string()))
            }
            ApiError::InvalidBody(ref rejection) => {
                (StatusCode::BAD_REQUEST, message(rejection.body_text()))
            }
            ApiError::InvalidQuery(ref rejection) => {
                (StatusCode::BAD_REQUEST, message(rejection.body_text()))
            }
        };

        (status, Json(body)).into_response()
    }
}

fn message(error: impl Into<String>) -> ErrorBody {
    ErrorBody {
        error: error.into(),
        fields: None,
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
