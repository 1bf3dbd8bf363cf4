//! Connection liveness watchdog.
//!
//! The device pings continuously while alive; any inbound frame counts as
//! liveness. The watchdog is a single deadline re-armed on traffic and
//! checked from the event loop; it fires at most once per arm cycle.

use std::time::{Duration, Instant};

use tracing::warn;

/// Default inactivity window.
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug)]
pub struct LivenessWatchdog {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl LivenessWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Re-arm from `now`; called on every inbound frame.
    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    /// Disarm, e.g. on connection close.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// True exactly once when the inactivity window has elapsed.
    pub fn expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                warn!(timeout = ?self.timeout, "no inbound traffic, liveness lost");
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for LivenessWatchdog {
    fn default() -> Self {
        Self::new(DEFAULT_LIVENESS_TIMEOUT)
    }
}
