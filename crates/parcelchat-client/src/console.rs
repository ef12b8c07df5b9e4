use std::sync::{Arc, Mutex};

use parcelchat_types::{AdminReplyResponse, MessageView, ThreadStatus, ThreadView};

use crate::config::PollerConfig;
use crate::error::{ClientError, Result};
use crate::http::AdminApi;
use crate::poller::{MessageSink, Poller, PollerHandle, PollerSnapshot};

/// Admin chat console. Fetches on demand: when a thread is opened and after
/// every reply or status change.
pub struct AdminConsole<A: AdminApi + 'static> {
    api: Arc<A>,
    poller: PollerHandle,
    /// Set synchronously by `open`; the poller snapshot lags behind it
    open_thread: Mutex<Option<String>>,
}

impl<A: AdminApi + 'static> AdminConsole<A> {
    pub fn new(api: Arc<A>, sink: Arc<dyn MessageSink>) -> Self {
        Self::with_config(api, sink, PollerConfig::admin_console())
    }

    pub fn with_config(api: Arc<A>, sink: Arc<dyn MessageSink>, config: PollerConfig) -> Self {
        let poller = Poller::spawn(api.clone(), sink, None, config);
        Self {
            api,
            poller,
            open_thread: Mutex::new(None),
        }
    }

    pub async fn list_threads(&self, status: Option<ThreadStatus>) -> Result<Vec<ThreadView>> {
        self.api.list_threads(status).await
    }

    pub fn open(&self, thread_id: impl Into<String>) {
        let thread_id = thread_id.into();
        *self.lock_open_thread() = Some(thread_id.clone());
        self.poller.activate(thread_id);
    }

    pub fn current_thread(&self) -> Option<String> {
        self.lock_open_thread().clone()
    }

    pub fn messages(&self) -> Vec<MessageView> {
        self.poller.snapshot().messages
    }

    pub async fn reply(&self, text: &str) -> Result<AdminReplyResponse> {
        let thread_id = self.current_thread().ok_or(ClientError::NoActiveThread)?;
        let response = self.api.reply(&thread_id, text).await?;
        self.poller.refresh();
        Ok(response)
    }

    pub async fn set_status(&self, thread_id: &str, status: ThreadStatus) -> Result<ThreadStatus> {
        let response = self.api.set_status(thread_id, status).await?;
        if self.current_thread().as_deref() == Some(thread_id) {
            self.poller.refresh();
        }
        Ok(response.status)
    }

    pub async fn delete(&self, thread_id: &str) -> Result<()> {
        self.api.delete_thread(thread_id).await?;
        let mut open_thread = self.lock_open_thread();
        if open_thread.as_deref() == Some(thread_id) {
            *open_thread = None;
            self.poller.close();
        }
        Ok(())
    }

    pub fn close_view(&self) {
        *self.lock_open_thread() = None;
        self.poller.close();
    }

    pub async fn wait_for(&self, predicate: impl FnMut(&PollerSnapshot) -> bool) -> PollerSnapshot {
        self.poller.wait_for(predicate).await
    }

    fn lock_open_thread(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.open_thread.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
