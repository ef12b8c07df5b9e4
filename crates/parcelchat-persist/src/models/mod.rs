mod db_message;
mod db_thread;

// Export database-agnostic models
pub use db_message::{Message, NewMessage};
pub use db_thread::{Contact, Thread, ThreadFilter};
