//! Poll policy for waiting on array-side state changes.

use std::time::Duration;

/// Fixed-interval, bounded poll policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between two status checks.
    pub interval: Duration,
    /// Maximum number of status checks (at least one is always made).
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Longest time a poll can take, for log messages.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Result of a bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition held on the returned observation.
    Done(T),
    /// Attempts ran out; carries the last observation.
    Exhausted(T),
}

impl<T> PollOutcome<T> {
    /// The observation, whether or not the condition was met.
    pub fn into_inner(self) -> T {
        match self {
            Self::Done(t) | Self::Exhausted(t) => t,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}
