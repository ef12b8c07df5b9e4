#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parcelchat_client::{AdminApi, ClientError, CustomerApi, MessageSink, MessageSource, Result};
use parcelchat_core::{Actor, ChatError, CustomerMessage, MessageIngestion, ThreadLifecycle};
use parcelchat_persist::{InMemoryPersistenceClient, Message, Thread, ThreadFilter};
use parcelchat_types::{
    AdminReplyResponse, DeleteThreadResponse, MessageView, PostMessageRequest,
    PostMessageResponse, Sender, StatusUpdateResponse, ThreadDetailResponse, ThreadStatus,
    ThreadView,
};

pub fn msg(id: &str) -> MessageView {
    MessageView {
        id: id.to_string(),
        sender: Sender::User,
        text: format!("text {id}"),
        created_at: String::new(),
        created_at_iso: chrono::Utc::now(),
    }
}

/// Message source whose answers the test controls
#[derive(Default)]
pub struct ScriptedSource {
    threads: Mutex<HashMap<String, Vec<MessageView>>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn with_thread(thread_id: &str, messages: Vec<MessageView>) -> Arc<Self> {
        let source = Self::default();
        source.set(thread_id, messages);
        Arc::new(source)
    }

    pub fn set(&self, thread_id: &str, messages: Vec<MessageView>) {
        self.threads.lock().unwrap().insert(thread_id.to_string(), messages);
    }

    pub fn push(&self, thread_id: &str, message: MessageView) {
        self.threads
            .lock()
            .unwrap()
            .entry(thread_id.to_string())
            .or_default()
            .push(message);
    }

    pub fn remove(&self, thread_id: &str) {
        self.threads.lock().unwrap().remove(thread_id);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<MessageView>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Http {
                status: 500,
                message: "Storage error".to_string(),
            });
        }
        self.threads
            .lock()
            .unwrap()
            .get(thread_id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}

/// Spy that counts UI updates
#[derive(Default)]
pub struct CountingSink {
    replaced: AtomicUsize,
    resets: AtomicUsize,
    last: Mutex<Vec<MessageView>>,
}

impl CountingSink {
    pub fn replaced(&self) -> usize {
        self.replaced.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Vec<MessageView> {
        self.last.lock().unwrap().clone()
    }
}

impl MessageSink for CountingSink {
    fn replace(&self, _thread_id: &str, messages: &[MessageView]) {
        self.replaced.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = messages.to_vec();
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.last.lock().unwrap().clear();
    }
}

fn message_view(message: Message) -> MessageView {
    MessageView {
        id: message.id,
        sender: message.sender,
        text: message.text,
        created_at: message.created_at.to_rfc3339(),
        created_at_iso: message.created_at,
    }
}

fn thread_view(thread: Thread) -> ThreadView {
    ThreadView {
        id: thread.id,
        first_name: thread.contact.first_name,
        last_name: thread.contact.last_name,
        email: thread.contact.email,
        phone: thread.contact.phone,
        status: thread.status,
        created_at: thread.created_at.to_rfc3339(),
        created_at_iso: thread.created_at,
    }
}

/// Customer and admin APIs served in-process by the real ingestion rules
pub struct InProcessApi {
    pub ingestion: MessageIngestion,
}

impl InProcessApi {
    pub fn new() -> Arc<Self> {
        let store = Arc::new(InMemoryPersistenceClient::new());
        let lifecycle = ThreadLifecycle::new(store);
        Arc::new(Self {
            ingestion: MessageIngestion::new(lifecycle, Default::default()),
        })
    }

    pub fn lifecycle(&self) -> &ThreadLifecycle {
        self.ingestion.lifecycle()
    }
}

fn to_client_error(err: ChatError) -> ClientError {
    match err {
        ChatError::NotFound(_) => ClientError::NotFound,
        ChatError::Validation(fields) => ClientError::Validation {
            message: "Validation failed".to_string(),
            fields,
        },
        other => ClientError::Http {
            status: 500,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl MessageSource for InProcessApi {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<MessageView>> {
        let messages = self
            .lifecycle()
            .messages(thread_id)
            .await
            .map_err(to_client_error)?;
        Ok(messages.into_iter().map(message_view).collect())
    }
}

#[async_trait]
impl CustomerApi for InProcessApi {
    async fn post_message(&self, request: &PostMessageRequest) -> Result<PostMessageResponse> {
        let posted = self
            .ingestion
            .post_customer_message(CustomerMessage::from(request.clone()))
            .await
            .map_err(to_client_error)?;
        Ok(PostMessageResponse {
            thread_id: posted.thread_id,
            message_id: posted.message_id,
            status: "ok".to_string(),
        })
    }

    async fn close_thread(&self, thread_id: &str) -> Result<StatusUpdateResponse> {
        let thread = self
            .lifecycle()
            .set_status(thread_id, ThreadStatus::Closed)
            .await
            .map_err(to_client_error)?;
        Ok(StatusUpdateResponse {
            message: "Thread status updated".to_string(),
            status: thread.status,
        })
    }
}

#[async_trait]
impl AdminApi for InProcessApi {
    async fn list_threads(&self, status: Option<ThreadStatus>) -> Result<Vec<ThreadView>> {
        let filter = match status {
            Some(status) => ThreadFilter::new().status(status),
            None => ThreadFilter::new(),
        };
        let threads = self
            .lifecycle()
            .list_threads(&Actor::admin(), filter)
            .await
            .map_err(to_client_error)?;
        Ok(threads.into_iter().map(thread_view).collect())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadDetailResponse> {
        let thread = self.lifecycle().get_thread(thread_id).await.map_err(to_client_error)?;
        let messages = self.fetch_messages(thread_id).await?;
        Ok(ThreadDetailResponse {
            thread: thread_view(thread),
            messages,
        })
    }

    async fn reply(&self, thread_id: &str, text: &str) -> Result<AdminReplyResponse> {
        let message = self
            .ingestion
            .post_admin_reply(&Actor::admin(), thread_id, text)
            .await
            .map_err(to_client_error)?;
        Ok(AdminReplyResponse {
            message: "Reply sent".to_string(),
            id: message.id,
        })
    }

    async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<StatusUpdateResponse> {
        let thread = self
            .lifecycle()
            .set_status(thread_id, status)
            .await
            .map_err(to_client_error)?;
        Ok(StatusUpdateResponse {
            message: "Thread status updated".to_string(),
            status: thread.status,
        })
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<DeleteThreadResponse> {
        self.lifecycle()
            .delete_thread(&Actor::admin(), thread_id)
            .await
            .map_err(to_client_error)?;
        Ok(DeleteThreadResponse {
            message: "Thread deleted".to_string(),
        })
    }
}
