use parcelchat_persist::PersistError;
use parcelchat_types::FieldError;
use thiserror::Error;

/// Domain error taxonomy shared by every chat operation
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin role required")]
    Forbidden,

    #[error("Thread not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Transient(#[source] PersistError),
}

impl ChatError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ChatError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatError::NotFound(_))
    }
}

impl From<PersistError> for ChatError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::ThreadNotFound(id) => ChatError::NotFound(id),
            other => ChatError::Transient(other),
        }
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ChatError>;
