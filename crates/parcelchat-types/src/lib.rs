pub mod model;
pub mod wire;
pub mod error;

pub use model::{Role, Sender, ThreadStatus, ParseStatusError};
pub use wire::{
    AdminReplyRequest, AdminReplyResponse, DeleteThreadResponse, MessageListResponse,
    MessageView, PostMessageRequest, PostMessageResponse, StatusUpdateRequest,
    StatusUpdateResponse, ThreadDetailResponse, ThreadListResponse, ThreadView,
};
pub use error::{ErrorBody, FieldError};

/// Storage key under which a client remembers its active thread
pub const THREAD_ID_STORAGE_KEY: &str = "parcelchat.thread_id";
