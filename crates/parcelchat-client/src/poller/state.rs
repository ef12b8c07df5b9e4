use parcelchat_types::MessageView;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// No thread open, nothing scheduled
    Idle,
    /// Thread visible, fetching on schedule
    Active,
    /// Host view hidden; polling paused until resumed
    Suspended,
}

/// Identifies one issued fetch. Sequence numbers only grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub thread_id: String,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// Local list replaced with the fetched one
    Replaced,
    /// Same length and same last id; local list kept as is
    Unchanged,
    /// Thread is gone; local state cleared and polling stopped
    Reset,
    /// Transient failure; the next scheduled fetch tries again
    Failed(ClientError),
    /// Response older than what is already applied, or for another thread
    Stale,
}

/// Append-only lists make "same length, same last id" a sufficient equality check.
pub fn needs_replace(held: &[MessageView], fetched: &[MessageView]) -> bool {
    held.len() != fetched.len() || held.last().map(|m| &m.id) != fetched.last().map(|m| &m.id)
}

/// Per-view poller state. Owns no timers and performs no I/O, so every
/// transition can be driven and checked synchronously.
#[derive(Debug)]
pub struct PollerCore {
    phase: PollPhase,
    thread_id: Option<String>,
    messages: Vec<MessageView>,
    issued_seq: u64,
    applied_seq: u64,
    in_flight: Option<u64>,
    refresh_pending: bool,
}

impl PollerCore {
    pub fn new() -> Self {
        Self {
            phase: PollPhase::Idle,
            thread_id: None,
            messages: Vec::new(),
            issued_seq: 0,
            applied_seq: 0,
            in_flight: None,
            refresh_pending: false,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn messages(&self) -> &[MessageView] {
        &self.messages
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Attach to a thread and become Active.
    ///
    /// Returns true when a different thread's messages were dropped from the
    /// local view, so the host has to blank its display.
    pub fn activate(&mut self, thread_id: impl Into<String>) -> bool {
        let thread_id = thread_id.into();
        let switching = self.thread_id.as_deref() != Some(thread_id.as_str());
        let cleared = switching && !self.messages.is_empty();

        if switching {
            self.messages.clear();
            self.in_flight = None;
            self.refresh_pending = false;
            self.thread_id = Some(thread_id);
        }
        self.phase = PollPhase::Active;
        cleared
    }

    pub fn suspend(&mut self) -> bool {
        if self.phase != PollPhase::Active {
            return false;
        }
        self.phase = PollPhase::Suspended;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != PollPhase::Suspended {
            return false;
        }
        self.phase = PollPhase::Active;
        true
    }

    /// Back to Idle with nothing held
    pub fn close(&mut self) {
        self.phase = PollPhase::Idle;
        self.thread_id = None;
        self.messages.clear();
        self.in_flight = None;
        self.refresh_pending = false;
    }

    /// Scheduled fetch. Skipped unless Active with nothing in flight.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.phase != PollPhase::Active || self.in_flight.is_some() {
            return None;
        }
        let thread_id = self.thread_id.clone()?;
        self.issued_seq += 1;
        self.in_flight = Some(self.issued_seq);
        Some(FetchTicket {
            seq: self.issued_seq,
            thread_id,
        })
    }

    /// Explicit refresh. When a fetch is already running it may predate the
    /// caller's write, so another one is queued behind it.
    pub fn request_refresh(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() && self.phase != PollPhase::Idle {
            self.refresh_pending = true;
            return None;
        }
        self.begin_fetch()
    }

    pub fn take_pending_refresh(&mut self) -> Option<FetchTicket> {
        if !std::mem::take(&mut self.refresh_pending) {
            return None;
        }
        self.begin_fetch()
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<MessageView>, ClientError>,
    ) -> FetchOutcome {
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
        }
        if ticket.seq <= self.applied_seq || self.thread_id.as_deref() != Some(ticket.thread_id.as_str()) {
            return FetchOutcome::Stale;
        }
        self.applied_seq = ticket.seq;

        match result {
            Ok(fetched) => {
                if needs_replace(&self.messages, &fetched) {
                    self.messages = fetched;
                    FetchOutcome::Replaced
                } else {
                    FetchOutcome::Unchanged
                }
            }
            Err(ClientError::NotFound) => {
                self.close();
                FetchOutcome::Reset
            }
            Err(err) => FetchOutcome::Failed(err),
        }
    }
}

impl Default for PollerCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelchat_types::Sender;

    fn msg(id: &str) -> MessageView {
        MessageView {
            id: id.to_string(),
            sender: Sender::User,
            text: format!("text {id}"),
            created_at: String::new(),
            created_at_iso: chrono::Utc::now(),
        }
    }

    fn active(thread_id: &str) -> PollerCore {
        let mut core = PollerCore::new();
        core.activate(thread_id);
        core
    }

    #[test]
    fn test_idle_never_fetches() {
        let mut core = PollerCore::new();
        assert_eq!(core.phase(), PollPhase::Idle);
        assert!(core.begin_fetch().is_none());
        assert!(core.request_refresh().is_none());
    }

    #[test]
    fn test_same_length_and_last_id_is_unchanged() {
        let mut core = active("t");
        let ticket = core.begin_fetch().unwrap();
        assert!(matches!(core.complete_fetch(ticket, Ok(vec![msg("a"), msg("b")])), FetchOutcome::Replaced));

        let ticket = core.begin_fetch().unwrap();
        assert!(matches!(core.complete_fetch(ticket, Ok(vec![msg("a"), msg("b")])), FetchOutcome::Unchanged));

        let ticket = core.begin_fetch().unwrap();
        assert!(matches!(
            core.complete_fetch(ticket, Ok(vec![msg("a"), msg("b"), msg("c")])),
            FetchOutcome::Replaced
        ));
        assert_eq!(core.messages().len(), 3);
    }

    #[test]
    fn test_needs_replace_detects_truncation_and_new_tail() {
        assert!(needs_replace(&[msg("a"), msg("b")], &[msg("a")]));
        assert!(needs_replace(&[msg("a"), msg("b")], &[msg("a"), msg("c")]));
        assert!(!needs_replace(&[], &[]));
    }

    #[test]
    fn test_only_one_fetch_in_flight() {
        let mut core = active("t");
        let first = core.begin_fetch().unwrap();
        assert!(core.begin_fetch().is_none());

        core.complete_fetch(first, Ok(vec![]));
        assert!(core.begin_fetch().is_some());
    }

    #[test]
    fn test_older_response_never_overwrites_newer() {
        let mut core = active("t");
        let slow = core.begin_fetch().unwrap();
        // Thread re-selected while the first request hangs; a second one goes out
        core.close();
        core.activate("t");
        let fast = core.begin_fetch().unwrap();
        assert!(fast.seq > slow.seq);

        assert!(matches!(core.complete_fetch(fast, Ok(vec![msg("a"), msg("b")])), FetchOutcome::Replaced));
        assert!(matches!(core.complete_fetch(slow, Ok(vec![msg("a")])), FetchOutcome::Stale));
        assert_eq!(core.messages().len(), 2);
    }

    #[test]
    fn test_response_for_previous_thread_is_discarded() {
        let mut core = active("t1");
        let ticket = core.begin_fetch().unwrap();
        core.activate("t2");

        assert!(matches!(core.complete_fetch(ticket, Ok(vec![msg("x")])), FetchOutcome::Stale));
        assert!(core.messages().is_empty());
    }

    #[test]
    fn test_not_found_resets_to_idle() {
        let mut core = active("t");
        let ticket = core.begin_fetch().unwrap();
        core.complete_fetch(ticket, Ok(vec![msg("a")]));

        let ticket = core.begin_fetch().unwrap();
        assert!(matches!(core.complete_fetch(ticket, Err(ClientError::NotFound)), FetchOutcome::Reset));
        assert_eq!(core.phase(), PollPhase::Idle);
        assert_eq!(core.thread_id(), None);
        assert!(core.messages().is_empty());
    }

    #[test]
    fn test_transient_failure_keeps_state() {
        let mut core = active("t");
        let ticket = core.begin_fetch().unwrap();
        core.complete_fetch(ticket, Ok(vec![msg("a")]));

        let ticket = core.begin_fetch().unwrap();
        let outcome = core.complete_fetch(
            ticket,
            Err(ClientError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        );
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(core.phase(), PollPhase::Active);
        assert_eq!(core.messages().len(), 1);
    }

    #[test]
    fn test_suspend_pauses_fetching() {
        let mut core = active("t");
        assert!(core.suspend());
        assert!(core.begin_fetch().is_none());
        assert!(core.resume());
        assert!(core.begin_fetch().is_some());
    }

    #[test]
    fn test_refresh_during_fetch_is_queued() {
        let mut core = active("t");
        let ticket = core.begin_fetch().unwrap();
        assert!(core.request_refresh().is_none());

        core.complete_fetch(ticket, Ok(vec![]));
        assert!(core.take_pending_refresh().is_some());
        assert!(core.take_pending_refresh().is_none());
    }

    #[test]
    fn test_activate_reports_cleared_view() {
        let mut core = active("t1");
        let ticket = core.begin_fetch().unwrap();
        core.complete_fetch(ticket, Ok(vec![msg("a")]));

        assert!(!core.activate("t1"));
        assert!(core.activate("t2"));
        assert!(core.messages().is_empty());
    }
}
