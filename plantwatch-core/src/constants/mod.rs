//! Constants for plantwatch
//!
//! Every numeric default used by the pipeline lives here, grouped by domain:
//! - **Sensors**: plausible ranges and failure thresholds
//! - **Time**: sampling, publishing and housekeeping cadences
//! - **Buffers**: compile-time capacities for `heapless` storage
//!
//! Time values are milliseconds and carry a `_MS` suffix.

/// Sensor ranges, calibration defaults and failure thresholds.
pub mod sensors;

/// Sampling, publishing and housekeeping cadences.
pub mod time;

/// Compile-time capacities for fixed-size storage.
pub mod buffers;

pub use sensors::{
    DEFAULT_SOIL_DRY_REFERENCE, DEFAULT_SOIL_WET_REFERENCE, FAILURE_WARN_THRESHOLD,
};

pub use time::{
    DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_PUBLISH_INTERVAL_MS, DEFAULT_STATUS_INTERVAL_MS,
    DEFAULT_HOUSEKEEPING_INTERVAL_MS, LOOP_PERIOD_MS,
};

pub use buffers::{MAX_WINDOW_CAPACITY, METRIC_COUNT, DISPLAY_LINE_LEN};
