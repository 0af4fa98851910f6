//! Configuration types for the search index client.

use std::time::Duration;

use listings_search_shared::EntityKind;

/// Default engine URL.
pub const DEFAULT_HOST: &str = "http://localhost:7700";

/// Default delay between two task status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of task status polls before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 50;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the HTTP index client.
#[derive(Debug, Clone)]
pub struct IndexClientConfig {
    /// Engine base URL.
    pub host: String,
    /// Sent as a bearer token when set.
    pub api_key: Option<String>,
    /// Fixed delay between task status polls.
    pub poll_interval: Duration,
    /// Maximum task status polls before `TaskTimeout`.
    pub max_poll_attempts: u32,
    pub request_timeout: Duration,
}

impl Default for IndexClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_key: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl IndexClientConfig {
    /// Create a config for the given host with default polling.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the task polling interval and attempt bound.
    pub fn with_task_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Index name per entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    pub jobs: String,
    pub events: String,
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            jobs: EntityKind::Job.default_index_name().to_string(),
            events: EntityKind::Event.default_index_name().to_string(),
        }
    }
}

impl IndexNames {
    pub fn new(jobs: impl Into<String>, events: impl Into<String>) -> Self {
        Self {
            jobs: jobs.into(),
            events: events.into(),
        }
    }

    /// Index holding documents of `kind`.
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Job => &self.jobs,
            EntityKind::Event => &self.events,
        }
    }
}
