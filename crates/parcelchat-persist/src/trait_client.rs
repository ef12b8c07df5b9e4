use async_trait::async_trait;
use parcelchat_types::ThreadStatus;

use crate::error::Result;
use crate::models::{Contact, Message, NewMessage, Thread, ThreadFilter};

/// Trait for chat persistence operations
///
/// Implementations provide database-specific storage for threads and their
/// append-only message logs. A thread exclusively owns its messages.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a new open thread
    async fn create_thread(&self, contact: Contact) -> Result<Thread>;

    /// Get a thread by ID
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// List threads, most recently updated first
    async fn list_threads(&self, filter: ThreadFilter) -> Result<Vec<Thread>>;

    /// Set thread status. Fails with `ThreadNotFound` if the thread is absent.
    async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<Thread>;

    /// Delete a thread together with all of its messages, atomically.
    /// Fails with `ThreadNotFound` if the thread is absent.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Append a message, assigning its id, sequence number and timestamp.
    /// Fails with `ThreadNotFound` if the parent thread is absent.
    async fn append_message(&self, message: NewMessage) -> Result<Message>;

    /// Get all messages for a thread ordered by (created_at, seq)
    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Cheap liveness check used by the health endpoint
    async fn ping(&self) -> Result<()>;
}
