use parcelchat_persist::{Message, NewMessage};
use parcelchat_types::{FieldError, PostMessageRequest, Sender};
use serde::Deserialize;

use crate::actor::Actor;
use crate::error::{ChatError, Result};
use crate::lifecycle::ThreadLifecycle;
use crate::validation::{validate_text, ContactInput};

/// What happens when a customer writes into a closed thread.
/// Neither variant reopens the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosedThreadPolicy {
    /// Append the message and leave the status closed
    #[default]
    Accept,
    /// Refuse with a validation error on `threadId`
    Reject,
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub closed_thread_policy: ClosedThreadPolicy,
    pub max_message_length: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            closed_thread_policy: ClosedThreadPolicy::Accept,
            max_message_length: 2000,
        }
    }
}

/// Inbound customer message. Contact is only consulted when `thread_id` is None.
#[derive(Debug, Clone, Default)]
pub struct CustomerMessage {
    pub thread_id: Option<String>,
    pub contact: ContactInput,
    pub text: String,
}

impl From<PostMessageRequest> for CustomerMessage {
    fn from(req: PostMessageRequest) -> Self {
        let contact = ContactInput::from(&req);
        Self {
            thread_id: req.thread_id.filter(|id| !id.trim().is_empty()),
            contact,
            text: req.message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub thread_id: String,
    pub message_id: String,
    pub created_thread: bool,
}

/// Single entry point for appending messages from either side of a thread
#[derive(Clone)]
pub struct MessageIngestion {
    lifecycle: ThreadLifecycle,
    config: IngestionConfig,
}

impl MessageIngestion {
    pub fn new(lifecycle: ThreadLifecycle, config: IngestionConfig) -> Self {
        Self { lifecycle, config }
    }

    pub fn lifecycle(&self) -> &ThreadLifecycle {
        &self.lifecycle
    }

    pub async fn post_customer_message(&self, msg: CustomerMessage) -> Result<PostedMessage> {
        let text = validate_text("message", &msg.text, self.config.max_message_length);

        let (thread_id, text, created_thread) = match msg.thread_id {
            Some(thread_id) => {
                let text = text?;
                let thread = self.lifecycle.get_thread(&thread_id).await?;
                if !thread.is_open() && self.config.closed_thread_policy == ClosedThreadPolicy::Reject {
                    return Err(ChatError::invalid("threadId", "thread is closed"));
                }
                (thread.id, text, false)
            }
            None => {
                // Report message and contact problems together
                let text = match (text, msg.contact.validate()) {
                    (Ok(text), Ok(_)) => text,
                    (text, contact) => {
                        let mut fields = validation_fields(text.err());
                        fields.extend(validation_fields(contact.err()));
                        return Err(ChatError::Validation(fields));
                    }
                };
                let thread = self.lifecycle.create_thread(&msg.contact).await?;
                (thread.id, text, true)
            }
        };

        let store = self.lifecycle.store();
        let message = match store
            .append_message(NewMessage::new(&thread_id, Sender::User, text))
            .await
        {
            Ok(message) => message,
            Err(e) => {
                // A thread is never left behind without its first message
                if created_thread {
                    if let Err(cleanup) = store.delete_thread(&thread_id).await {
                        tracing::error!(thread_id = %thread_id, error = %cleanup, "Failed to remove empty thread");
                    }
                }
                return Err(e.into());
            }
        };

        tracing::debug!(thread_id = %thread_id, message_id = %message.id, "Customer message stored");

        Ok(PostedMessage {
            thread_id,
            message_id: message.id,
            created_thread,
        })
    }

    /// Admin reply; replies into closed threads are allowed
    pub async fn post_admin_reply(&self, actor: &Actor, thread_id: &str, text: &str) -> Result<Message> {
        actor.require_admin()?;
        let text = validate_text("message", text, self.config.max_message_length)?;
        self.lifecycle.get_thread(thread_id).await?;

        let message = self
            .lifecycle
            .store()
            .append_message(NewMessage::new(thread_id, Sender::Admin, text))
            .await?;

        tracing::debug!(thread_id = %thread_id, message_id = %message.id, "Admin reply stored");
        Ok(message)
    }
}

fn validation_fields(err: Option<ChatError>) -> Vec<FieldError> {
    match err {
        Some(ChatError::Validation(fields)) => fields,
        Some(other) => vec![FieldError::new("request", other.to_string())],
        None => Vec::new(),
    }
}
