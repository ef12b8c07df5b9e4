//! Process-local backend used by tests and single-node development setups.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parcelchat_types::ThreadStatus;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{Contact, Message, NewMessage, Thread, ThreadFilter};
use crate::trait_client::PersistenceClient;

struct ThreadEntry {
    thread: Thread,
    messages: Vec<Message>,
    next_seq: i64,
}

/// In-memory `PersistenceClient`
///
/// Threads and their messages live in one map guarded by a single lock, so a
/// delete removes both in the same critical section.
#[derive(Default)]
pub struct InMemoryPersistenceClient {
    threads: RwLock<HashMap<String, ThreadEntry>>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn create_thread(&self, contact: Contact) -> Result<Thread> {
        let now = Utc::now();
        let thread = Thread {
            id: uuid::Uuid::new_v4().to_string(),
            contact,
            status: ThreadStatus::Open,
            created_at: now,
            updated_at: now,
        };

        self.threads.write().await.insert(
            thread.id.clone(),
            ThreadEntry {
                thread: thread.clone(),
                messages: Vec::new(),
                next_seq: 1,
            },
        );
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).map(|entry| entry.thread.clone()))
    }

    async fn list_threads(&self, filter: ThreadFilter) -> Result<Vec<Thread>> {
        let threads = self.threads.read().await;
        let mut matching: Vec<Thread> = threads
            .values()
            .map(|entry| &entry.thread)
            .filter(|thread| filter.matches(thread))
            .cloned()
            .collect();

        matching.sort_by(Thread::cmp_by_activity);
        matching.truncate(filter.limit.max(0) as usize);
        Ok(matching)
    }

    async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<Thread> {
        let mut threads = self.threads.write().await;
        let entry = threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;

        if entry.thread.status != status {
            entry.thread.status = status;
            entry.thread.updated_at = Utc::now();
        }
        Ok(entry.thread.clone())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.threads
            .write()
            .await
            .remove(thread_id)
            .map(|_| ())
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message> {
        let mut threads = self.threads.write().await;
        let entry = threads
            .get_mut(&message.thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(message.thread_id.clone()))?;

        // Wall clocks can step backwards; keep timestamps non-decreasing per thread.
        let mut created_at = Utc::now();
        if let Some(last) = entry.messages.last() {
            created_at = created_at.max(last.created_at);
        }

        let stored = Message {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: message.thread_id,
            sender: message.sender,
            text: message.text,
            seq: entry.next_seq,
            created_at,
        };
        entry.next_seq += 1;
        entry.thread.updated_at = created_at;
        entry.messages.push(stored.clone());
        Ok(stored)
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let threads = self.threads.read().await;
        let mut messages = threads
            .get(thread_id)
            .map(|entry| entry.messages.clone())
            .unwrap_or_default();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.seq.cmp(&b.seq)));
        Ok(messages)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
