//! Time Source Abstraction
//!
//! ## Common Implementations
//!
//! - `MonotonicTime`: `std::time::Instant` based, for hosts
//! - `FixedTime`: manually advanced, for tests
//!
//! Board crates wrap their hardware timer.

use crate::time::Timestamp;

/// Source of time for the scheduler
///
/// ## Implementation Requirements
///
/// - Milliseconds since boot (or any fixed origin)
/// - Must not go backwards; consumers saturate if it does
/// - Timer wraparound must be extended to 64 bits by the implementation
///
/// ## Example Implementation
///
/// ```rust
/// use plantwatch_core::traits::TimeSource;
/// use plantwatch_core::time::Timestamp;
///
/// struct TickCounter {
///     ticks: u64,
///     ticks_per_ms: u64,
/// }
///
/// impl TimeSource for TickCounter {
///     fn now(&self) -> Timestamp {
///         self.ticks / self.ticks_per_ms
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
