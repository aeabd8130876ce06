//! Time-Related Constants
//!
//! Default cadences for the scheduler and transport. All are overridable
//! through configuration; the ratio between sample and publish interval is
//! always derived, never fixed.

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== SCHEDULER CADENCES =====

/// Time between individual sensor reads (milliseconds).
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 6 * MS_PER_SECOND;

/// Time between averaged publishes (milliseconds).
///
/// With the default sample interval this gives 10 samples per window.
pub const DEFAULT_PUBLISH_INTERVAL_MS: u64 = 60 * MS_PER_SECOND;

/// Time between periodic device status publishes (milliseconds).
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 300 * MS_PER_SECOND;

/// Time between connection health probes and resource checks (milliseconds).
pub const DEFAULT_HOUSEKEEPING_INTERVAL_MS: u64 = 60 * MS_PER_SECOND;

/// Sleep between loop iterations (milliseconds).
pub const LOOP_PERIOD_MS: u64 = 500;

/// A publish gap longer than this marks the device as timed out (milliseconds).
pub const PUBLISH_TIMEOUT_MS: u64 = 300 * MS_PER_SECOND;

/// Averages older than this many publish intervals render as placeholders.
pub const STALE_AFTER_PUBLISH_INTERVALS: u64 = 3;

// ===== TRANSPORT =====

/// Connect attempts per connection cycle.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;

/// Delay after the first failed attempt (milliseconds).
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 2 * MS_PER_SECOND;

/// Upper bound for the exponential backoff (milliseconds).
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 16 * MS_PER_SECOND;

/// Pause after an exhausted connection cycle (milliseconds).
pub const DEFAULT_COOLDOWN_MS: u64 = 60 * MS_PER_SECOND;

/// Bound on a single broker handshake (milliseconds).
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5 * MS_PER_SECOND;

/// Broker keep-alive (seconds).
pub const DEFAULT_KEEP_ALIVE_SECS: u16 = 120;
