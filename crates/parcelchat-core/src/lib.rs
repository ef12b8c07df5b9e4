pub mod error;
pub mod actor;
pub mod validation;
pub mod lifecycle;
pub mod ingestion;

pub use error::{ChatError, Result};
pub use validation::{ContactInput, MIN_PHONE_DIGITS};
pub use actor::Actor;
pub use lifecycle::ThreadLifecycle;
pub use ingestion::{
    ClosedThreadPolicy, CustomerMessage, IngestionConfig, MessageIngestion, PostedMessage,
};
