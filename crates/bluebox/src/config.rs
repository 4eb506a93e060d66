//! Driver configuration: transfer timeouts and discovery policy.

use std::time::Duration;

/// Default timeout for control transfers.
pub const DEFAULT_CONTROL_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default interval between discovery polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How to wait for a Bluebox to appear on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    /// Delay between enumeration attempts.
    pub poll_interval: Duration,
    /// Give up after this long; `None` waits until the device shows up.
    pub timeout: Option<Duration>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl Discovery {
    /// Single enumeration pass, no waiting.
    pub fn once() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(Duration::ZERO),
        }
    }
}

/// Bluebox driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Timeout applied to every control transfer.
    pub control_timeout: Duration,
    /// Timeout for bulk transfers; `None` blocks indefinitely.
    pub bulk_timeout: Option<Duration>,
    /// Device discovery policy used by `open`.
    pub discovery: Discovery,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            control_timeout: DEFAULT_CONTROL_TIMEOUT,
            bulk_timeout: None,
            discovery: Discovery::default(),
        }
    }
}

impl Config {
    pub fn with_control_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self
    }

    pub fn with_bulk_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.bulk_timeout = timeout;
        self
    }

    pub fn with_discovery_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.discovery.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.discovery.poll_interval = interval;
        self
    }
}
