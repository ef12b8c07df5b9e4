use std::sync::Arc;

use parcelchat_core::{MessageIngestion, ThreadLifecycle};
use parcelchat_persist::PersistenceClient;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PersistenceClient>,
    pub lifecycle: ThreadLifecycle,
    pub ingestion: MessageIngestion,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PersistenceClient>) -> Self {
        let lifecycle = ThreadLifecycle::new(Arc::clone(&store));
        let ingestion = MessageIngestion::new(lifecycle.clone(), config.chat.ingestion());
        Self {
            config: Arc::new(config),
            store,
            lifecycle,
            ingestion,
        }
    }

    pub fn timestamp_format(&self) -> &str {
        &self.config.chat.timestamp_format
    }
}
