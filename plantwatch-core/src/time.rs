//! Time management for the scheduler
//!
//! The pipeline never reads a clock itself. The loop driver asks a
//! [`TimeSource`] once per iteration and passes the timestamp down, so every
//! component can be driven by a fake clock in tests.

use crate::traits::TimeSource;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Milliseconds between two timestamps, zero if the clock went backwards
pub fn elapsed(since: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(since)
}

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 when created, always increases
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Fixed-rate trigger
///
/// Fires on the first poll, then once every `interval_ms`. Missed periods are
/// not replayed: a late poll fires once and re-arms from that moment.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval_ms: u64,
    last: Option<Timestamp>,
}

impl Cadence {
    /// Trigger every `interval_ms`
    pub const fn new(interval_ms: u64) -> Self {
        Self { interval_ms, last: None }
    }

    /// True if a period has elapsed since the last firing; records the firing
    pub fn poll(&mut self, now: Timestamp) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => elapsed(last, now) >= self.interval_ms,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Fire on the next poll regardless of the interval
    pub fn force(&mut self) {
        self.last = None;
    }

    /// Configured period
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}
