use std::sync::Arc;

use parcelchat_types::{MessageView, PostMessageRequest, PostMessageResponse};

use crate::config::PollerConfig;
use crate::error::{ClientError, Result};
use crate::http::CustomerApi;
use crate::poller::{MessageSink, PollPhase, Poller, PollerHandle, PollerSnapshot};
use crate::storage::ThreadIdStore;

/// Contact form shown before the first message
#[derive(Debug, Clone)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Public chat widget: one conversation per browser, remembered across reloads.
///
/// Sent messages are not inserted locally; they show up once the refetch that
/// follows every send returns them.
pub struct ChatWidget<A: CustomerApi + 'static> {
    api: Arc<A>,
    thread_store: Arc<dyn ThreadIdStore>,
    poller: PollerHandle,
}

impl<A: CustomerApi + 'static> ChatWidget<A> {
    pub fn new(
        api: Arc<A>,
        thread_store: Arc<dyn ThreadIdStore>,
        sink: Arc<dyn MessageSink>,
        config: PollerConfig,
    ) -> Self {
        let poller = Poller::spawn(api.clone(), sink, Some(Arc::clone(&thread_store)), config);
        Self {
            api,
            thread_store,
            poller,
        }
    }

    /// Reattach to a remembered conversation, if any
    pub fn start(&self) -> Option<String> {
        let thread_id = self.thread_store.load()?;
        tracing::debug!(thread_id = %thread_id, "Reattaching to stored chat thread");
        self.poller.activate(thread_id.clone());
        Some(thread_id)
    }

    /// The remembered conversation. The store is updated synchronously on
    /// every send and reset, so it never lags behind the poller.
    pub fn thread_id(&self) -> Option<String> {
        self.thread_store.load()
    }

    pub fn messages(&self) -> Vec<MessageView> {
        self.poller.snapshot().messages
    }

    pub fn poller(&self) -> &PollerHandle {
        &self.poller
    }

    /// Post a message. `contact` is required only when no conversation exists yet.
    pub async fn send(&self, contact: Option<&ContactDetails>, text: &str) -> Result<PostMessageResponse> {
        let thread_id = self.thread_id();

        let mut request = PostMessageRequest {
            thread_id: thread_id.clone(),
            message: text.to_string(),
            ..PostMessageRequest::default()
        };
        if thread_id.is_none() {
            let contact = contact.ok_or(ClientError::MissingContact)?;
            request.first_name = Some(contact.first_name.clone());
            request.last_name = Some(contact.last_name.clone());
            request.email = Some(contact.email.clone());
            request.phone = Some(contact.phone.clone());
        }

        let response = match self.api.post_message(&request).await {
            Ok(response) => response,
            Err(ClientError::NotFound) => {
                // Conversation was deleted; the next send starts a fresh one
                self.forget();
                return Err(ClientError::NotFound);
            }
            Err(err) => return Err(err),
        };

        if thread_id.as_deref() != Some(response.thread_id.as_str()) {
            self.thread_store.save(&response.thread_id)?;
        }
        // Activating the current thread again doubles as a refresh
        self.poller.activate(response.thread_id.clone());
        Ok(response)
    }

    /// Close the conversation and forget it locally
    pub async fn close(&self) -> Result<()> {
        let Some(thread_id) = self.thread_id() else {
            return Ok(());
        };
        match self.api.close_thread(&thread_id).await {
            Ok(_) | Err(ClientError::NotFound) => {
                self.forget();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Host tab visibility changed
    pub fn set_visible(&self, visible: bool) {
        if visible {
            self.poller.resume();
        } else {
            self.poller.suspend();
        }
    }

    pub async fn wait_for(&self, predicate: impl FnMut(&PollerSnapshot) -> bool) -> PollerSnapshot {
        self.poller.wait_for(predicate).await
    }

    pub fn is_polling(&self) -> bool {
        self.poller.snapshot().phase == PollPhase::Active
    }

    fn forget(&self) {
        if let Err(e) = self.thread_store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored thread id");
        }
        self.poller.close();
    }
}
