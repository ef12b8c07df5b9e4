use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use parcelchat_types::ThreadStatus;
use serde::{Deserialize, Serialize};

/// Customer contact captured when the thread is opened. Never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Database-agnostic thread model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub contact: Contact,
    pub status: ThreadStatus,
    pub created_at: DateTime<Utc>,
    /// Bumped on every appended message and status change
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn is_open(&self) -> bool {
        self.status == ThreadStatus::Open
    }

    /// Listing order shared by every backend: most recently updated first,
    /// ties go to the newer thread, then to the greater id.
    pub fn cmp_by_activity(a: &Thread, b: &Thread) -> Ordering {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Admin listing filter. Results are ordered most recently updated first.
#[derive(Debug, Clone)]
pub struct ThreadFilter {
    pub status: Option<ThreadStatus>,
    pub limit: i64,
}

impl ThreadFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ThreadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit.clamp(1, Self::MAX_LIMIT);
        self
    }

    pub fn matches(&self, thread: &Thread) -> bool {
        self.status.map_or(true, |s| s == thread.status)
    }
}

impl Default for ThreadFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
