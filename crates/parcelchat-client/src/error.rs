use parcelchat_types::FieldError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The thread no longer exists; callers should drop their reference to it
    #[error("Thread not found")]
    NotFound,

    #[error("Request rejected: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Not authorized (HTTP {0})")]
    Unauthorized(u16),

    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Contact details are required to start a conversation")]
    MissingContact,

    #[error("No conversation is open")]
    NoActiveThread,
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
