use std::time::Duration;

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token sent on admin routes
    pub admin_token: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            admin_token: None,
            request_timeout: None,
        }
    }

    pub fn admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// When an active poller fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSchedule {
    /// Fetch on activation, then every period
    Interval(Duration),
    /// Fetch on activation and on explicit refresh only
    OnDemand,
}

impl PollSchedule {
    pub fn period(&self) -> Option<Duration> {
        match self {
            PollSchedule::Interval(period) => Some(*period),
            PollSchedule::OnDemand => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub schedule: PollSchedule,
}

impl PollerConfig {
    pub const WIDGET_INTERVAL: Duration = Duration::from_secs(8);

    /// Public widget: poll every 8 seconds
    pub fn customer_widget() -> Self {
        Self {
            schedule: PollSchedule::Interval(Self::WIDGET_INTERVAL),
        }
    }

    /// Admin console: refetch after each send only
    pub fn admin_console() -> Self {
        Self {
            schedule: PollSchedule::OnDemand,
        }
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::customer_widget()
    }
}
