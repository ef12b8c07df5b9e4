use chrono::{DateTime, Utc};
use parcelchat_types::Sender;
use serde::{Deserialize, Serialize};

/// Database-agnostic message model
///
/// `seq` is assigned by the store, strictly increasing within a thread, and
/// breaks ties between messages written in the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub sender: Sender,
    pub text: String,
    pub seq: i64,
    pub created_at: DateTime<Utc>,
}

/// A message about to be appended; the store fills in id, seq and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub thread_id: String,
    pub sender: Sender,
    pub text: String,
}

impl NewMessage {
    pub fn new(thread_id: impl Into<String>, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            sender,
            text: text.into(),
        }
    }
}
