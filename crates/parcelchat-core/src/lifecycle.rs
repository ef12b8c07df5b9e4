use std::sync::Arc;

use parcelchat_persist::{Message, PersistenceClient, Thread, ThreadFilter};
use parcelchat_types::ThreadStatus;

use crate::actor::Actor;
use crate::error::{ChatError, Result};
use crate::validation::ContactInput;

/// Owns creation, status transitions and deletion of threads.
///
/// Contact fields only enter through `create_thread` and are never rewritten.
#[derive(Clone)]
pub struct ThreadLifecycle {
    store: Arc<dyn PersistenceClient>,
}

impl ThreadLifecycle {
    pub fn new(store: Arc<dyn PersistenceClient>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PersistenceClient> {
        &self.store
    }

    pub async fn create_thread(&self, contact: &ContactInput) -> Result<Thread> {
        let contact = contact.validate()?;
        let thread = self.store.create_thread(contact).await?;
        tracing::info!(thread_id = %thread.id, "Chat thread opened");
        Ok(thread)
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        self.store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(thread_id.to_string()))
    }

    /// Setting the current status again succeeds without changing anything.
    pub async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<Thread> {
        let thread = self.store.set_status(thread_id, status).await?;
        tracing::info!(thread_id = %thread_id, status = %status, "Chat thread status set");
        Ok(thread)
    }

    pub async fn delete_thread(&self, actor: &Actor, thread_id: &str) -> Result<()> {
        actor.require_admin()?;
        self.store.delete_thread(thread_id).await?;
        tracing::info!(thread_id = %thread_id, "Chat thread deleted");
        Ok(())
    }

    pub async fn list_threads(&self, actor: &Actor, filter: ThreadFilter) -> Result<Vec<Thread>> {
        actor.require_admin()?;
        Ok(self.store.list_threads(filter).await?)
    }

    /// Messages of an existing thread in display order
    pub async fn messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        self.get_thread(thread_id).await?;
        Ok(self.store.get_messages(thread_id).await?)
    }
}
