//! Decaying attempt counter.

use std::time::Duration;
use tokio::time::Instant;

/// Attempts charged to one key over a rolling window.
///
/// Instead of keeping a timestamp per attempt, the counter leaks one unit
/// per whole second elapsed since its last charge. A counter always holds
/// at least one unit while it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    /// Number of attempts currently charged to this window
    current_count: u64,
    /// When the counter was last charged
    last_update: Instant,
}

impl Counter {
    /// Create a counter holding its first charge.
    pub fn new(now: Instant) -> Self {
        Self {
            current_count: 1,
            last_update: now,
        }
    }

    /// Charge one attempt at `now` and return the resulting count.
    ///
    /// Whole seconds elapsed since the last charge leak out first. If at
    /// least `current_count` seconds passed the bucket is empty and the
    /// count restarts at 1 (equality resets too).
    pub fn charge(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs();

        if elapsed >= self.current_count {
            self.current_count = 1;
        } else {
            // elapsed < current_count, so this never underflows
            self.current_count = self.current_count + 1 - elapsed;
        }

        self.last_update = now;
        self.current_count
    }

    /// Whether the counter has gone without a charge for strictly longer than `max_idle`.
    pub fn is_stale(&self, now: Instant, max_idle: Duration) -> bool {
        now.saturating_duration_since(self.last_update) > max_idle
    }

    /// Get the current count.
    pub fn current_count(&self) -> u64 {
        self.current_count
    }

    /// Get the time of the last charge.
    pub fn last_update(&self) -> Instant {
        self.last_update
    }
}
