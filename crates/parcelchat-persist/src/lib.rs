pub mod models;
pub mod trait_client;
pub mod error;
pub mod dbs;

pub use models::{Contact, Message, NewMessage, Thread, ThreadFilter};
pub use trait_client::PersistenceClient;
pub use error::{PersistError, Result};
pub use dbs::memory::InMemoryPersistenceClient;

#[cfg(feature = "mongodb")]
pub use dbs::mongo::client::MongoPersistenceClient;
