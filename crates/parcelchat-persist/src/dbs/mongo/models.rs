use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use parcelchat_types::{Sender, ThreadStatus};
use serde::{Deserialize, Serialize};

use crate::models::{Contact, Message, Thread};

/// MongoDB-specific Thread model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub contact: Contact,
    pub status: ThreadStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    /// Last sequence number handed out to a message of this thread
    #[serde(default)]
    pub last_seq: i64,
}

/// MongoDB-specific Message model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub thread_id: ObjectId,
    pub sender: Sender,
    pub text: String,
    pub seq: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

// Conversions from MongoDB-specific to database-agnostic models

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id.to_hex(),
            contact: thread.contact,
            status: thread.status,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl From<MongoMessage> for Message {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id.to_hex(),
            thread_id: msg.thread_id.to_hex(),
            sender: msg.sender,
            text: msg.text,
            seq: msg.seq,
            created_at: msg.created_at,
        }
    }
}
