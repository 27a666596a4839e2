//! Dispatcher configuration.

use std::time::Duration;

/// Configuration for the reminder dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Time between polls.
    pub interval: Duration,

    /// Maximum deliveries in flight per tick.
    pub concurrency: usize,

    /// Upper bound on one delivery, including waiting for the channel.
    pub send_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            concurrency: 10,
            send_timeout: Duration::from_secs(10),
        }
    }
}

impl DispatchConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}
