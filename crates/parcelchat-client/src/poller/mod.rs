//! Client-side polling of a thread's messages.
//!
//! `PollerCore` holds the state machine; `Poller` runs it on a tokio task that
//! multiplexes commands, the interval timer, and the single in-flight fetch.

mod state;

use std::future::pending;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parcelchat_types::MessageView;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub use self::state::{needs_replace, FetchOutcome, FetchTicket, PollPhase, PollerCore};

use crate::config::PollerConfig;
use crate::error::Result;
use crate::storage::ThreadIdStore;

/// Where messages are fetched from
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_messages(&self, thread_id: &str) -> Result<Vec<MessageView>>;
}

/// Receives UI updates. Called only when the visible list actually changes.
pub trait MessageSink: Send + Sync {
    fn replace(&self, thread_id: &str, messages: &[MessageView]);

    /// The view went back to Idle (closed, or the thread disappeared)
    fn reset(&self) {}
}

/// Read-only view of a poller's state
#[derive(Debug, Clone, PartialEq)]
pub struct PollerSnapshot {
    pub phase: PollPhase,
    pub thread_id: Option<String>,
    pub messages: Vec<MessageView>,
    pub applied_seq: u64,
}

#[derive(Debug)]
enum Command {
    Activate(String),
    Suspend,
    Resume,
    Refresh,
    Close,
}

type InFlight = BoxFuture<'static, (FetchTicket, Result<Vec<MessageView>>)>;

/// Owner side of a running poller. Dropping it stops the task.
pub struct PollerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<PollerSnapshot>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn activate(&self, thread_id: impl Into<String>) {
        self.send(Command::Activate(thread_id.into()));
    }

    pub fn suspend(&self) {
        self.send(Command::Suspend);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn close(&self) {
        self.send(Command::Close);
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait until the published state satisfies `predicate`
    pub async fn wait_for(&self, predicate: impl FnMut(&PollerSnapshot) -> bool) -> PollerSnapshot {
        let mut rx = self.snapshot.clone();
        let snapshot = match rx.wait_for(predicate).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }

    pub fn shutdown(self) {}

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Poller task already stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct Poller {
    core: PollerCore,
    config: PollerConfig,
    source: Arc<dyn MessageSource>,
    sink: Arc<dyn MessageSink>,
    thread_store: Option<Arc<dyn ThreadIdStore>>,
    snapshot: watch::Sender<PollerSnapshot>,
    ticker: Option<Interval>,
    in_flight: Option<InFlight>,
}

impl Poller {
    /// Start a poller task in Idle. `thread_store`, when given, is cleared if
    /// the server reports the thread as gone.
    pub fn spawn(
        source: Arc<dyn MessageSource>,
        sink: Arc<dyn MessageSink>,
        thread_store: Option<Arc<dyn ThreadIdStore>>,
        config: PollerConfig,
    ) -> PollerHandle {
        let core = PollerCore::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot_of(&core));
        let (commands, rx) = mpsc::unbounded_channel();

        let poller = Self {
            core,
            config,
            source,
            sink,
            thread_store,
            snapshot: snapshot_tx,
            ticker: None,
            in_flight: None,
        };
        let task = tokio::spawn(poller.run(rx));

        PollerHandle {
            commands,
            snapshot: snapshot_rx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => {
                    if let Some(ticket) = self.core.begin_fetch() {
                        self.start_fetch(ticket);
                    } else {
                        tracing::trace!("Poll tick skipped, fetch still in flight");
                    }
                }
                (ticket, result) = next_result(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.finish(ticket, result);
                }
            }
            self.publish();
        }
        tracing::debug!("Poller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Activate(thread_id) => {
                let switching = self.core.thread_id() != Some(thread_id.as_str());
                if switching {
                    // Requests for the previous thread are dropped, not awaited
                    self.in_flight = None;
                }
                if self.core.activate(thread_id.clone()) {
                    self.sink.replace(&thread_id, &[]);
                }
                self.rearm();
                if let Some(ticket) = self.core.request_refresh() {
                    self.start_fetch(ticket);
                }
            }
            Command::Suspend => {
                if self.core.suspend() {
                    self.ticker = None;
                }
            }
            Command::Resume => {
                if self.core.resume() {
                    self.rearm();
                    if let Some(ticket) = self.core.begin_fetch() {
                        self.start_fetch(ticket);
                    }
                }
            }
            Command::Refresh => {
                if let Some(ticket) = self.core.request_refresh() {
                    self.start_fetch(ticket);
                }
            }
            Command::Close => {
                self.stop();
                self.sink.reset();
            }
        }
    }

    fn finish(&mut self, ticket: FetchTicket, result: Result<Vec<MessageView>>) {
        let thread_id = ticket.thread_id.clone();
        match self.core.complete_fetch(ticket, result) {
            FetchOutcome::Replaced => {
                self.sink.replace(&thread_id, self.core.messages());
            }
            FetchOutcome::Unchanged => {}
            FetchOutcome::Reset => {
                tracing::info!(thread_id = %thread_id, "Thread no longer exists, resetting chat view");
                // The store may already point at a newer conversation
                if let Some(store) = &self.thread_store {
                    if store.load().as_deref() == Some(thread_id.as_str()) {
                        if let Err(e) = store.clear() {
                            tracing::warn!(error = %e, "Failed to clear stored thread id");
                        }
                    }
                }
                self.stop();
                self.sink.reset();
            }
            FetchOutcome::Failed(err) => {
                tracing::warn!(thread_id = %thread_id, error = %err, "Message poll failed, will retry");
            }
            FetchOutcome::Stale => {
                tracing::debug!(thread_id = %thread_id, "Discarded stale poll response");
            }
        }

        if let Some(ticket) = self.core.take_pending_refresh() {
            self.start_fetch(ticket);
        }
    }

    fn start_fetch(&mut self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        self.in_flight = Some(
            async move {
                let result = source.fetch_messages(&ticket.thread_id).await;
                (ticket, result)
            }
            .boxed(),
        );
    }

    /// Drop the current interval before arming a fresh one
    fn rearm(&mut self) {
        self.ticker = None;
        if let Some(period) = self.config.schedule.period() {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some(ticker);
        }
    }

    fn stop(&mut self) {
        self.core.close();
        self.ticker = None;
        self.in_flight = None;
    }

    fn publish(&self) {
        let next = snapshot_of(&self.core);
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

fn snapshot_of(core: &PollerCore) -> PollerSnapshot {
    PollerSnapshot {
        phase: core.phase(),
        thread_id: core.thread_id().map(str::to_string),
        messages: core.messages().to_vec(),
        applied_seq: core.applied_seq(),
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn next_result(in_flight: &mut Option<InFlight>) -> (FetchTicket, Result<Vec<MessageView>>) {
    match in_flight {
        Some(fetch) => fetch.await,
        None => pending().await,
    }
}
