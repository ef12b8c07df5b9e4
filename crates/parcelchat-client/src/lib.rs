pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod poller;
pub mod widget;
pub mod console;

pub use config::{ClientConfig, PollSchedule, PollerConfig};
pub use error::{ClientError, Result};
pub use http::{AdminApi, AdminClient, CustomerApi, CustomerClient, HttpTransport};
pub use storage::{FileThreadIdStore, MemoryThreadIdStore, ThreadIdStore};
pub use poller::{
    FetchOutcome, FetchTicket, MessageSink, MessageSource, PollPhase, Poller, PollerCore,
    PollerHandle, PollerSnapshot,
};
pub use widget::{ChatWidget, ContactDetails};
pub use console::AdminConsole;
