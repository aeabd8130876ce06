//! Buffer Sizes for Fixed-Capacity Storage
//!
//! Capacities are compile-time so that RAM use is known at link time.
//!
//! ```text
//! Window<64>       = 64 * 24 bytes (Reading) + 24 bytes  ≈ 1.6 KB
//! Aggregator       = 4 windows                           ≈ 6.2 KB
//! DisplaySink      = 4 * (Average + Timestamp)           ≈ 0.2 KB
//! ```

/// Number of metric kinds the device reports.
pub const METRIC_COUNT: usize = 4;

/// Maximum samples per averaging window.
///
/// The configured window (publish interval / sample interval) must not exceed it.
pub const MAX_WINDOW_CAPACITY: usize = 64;

/// Metric kinds one physical sensor may serve (DHT11: temperature + humidity).
pub const MAX_KINDS_PER_SENSOR: usize = METRIC_COUNT;

/// Characters per display line (128 px wide panel, 8 px font = 16, with margin).
pub const DISPLAY_LINE_LEN: usize = 32;

/// Lines rendered per frame: one per metric plus the status line.
pub const DISPLAY_LINES: usize = METRIC_COUNT + 1;

/// Formatted state payload length.
pub const VALUE_TEXT_LEN: usize = 16;

/// Free heap below which housekeeping logs a low-memory warning.
pub const LOW_MEMORY_WARN_BYTES: usize = 10 * 1024;
