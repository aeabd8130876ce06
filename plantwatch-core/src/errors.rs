//! Error Types for the Acquisition Pipeline
//!
//! ## Design Philosophy
//!
//! Failures in plantwatch are scoped by how far they are allowed to travel:
//!
//! | Error          | Scope                  | Effect                                      |
//! |----------------|------------------------|---------------------------------------------|
//! | `SensorError`  | one reading            | reading excluded from its window            |
//! | `DisplayError` | one render             | logged, otherwise ignored                   |
//! | `ConfigError`  | process startup        | agent refuses to enter the main loop        |
//!
//! Network failures live in `plantwatch-connectors` because they drive the
//! transport state machine rather than the sampling path.
//!
//! All variants here are `Copy` and carry only inline data or `&'static str`,
//! so they can be returned from the hot path without touching the heap.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use plantwatch_core::{MetricKind, SensorError};
//!
//! fn on_read(result: Result<f32, SensorError>) -> Option<f32> {
//!     match result {
//!         Ok(value) => Some(value),
//!         Err(SensorError::NotPresent) => None,      // count against the sensor, not the loop
//!         Err(SensorError::Timeout) => None,         // next tick will try again
//!         Err(SensorError::ChecksumFailure) => None, // single-wire glitch
//!         Err(SensorError::OutOfRange { .. }) => None,
//!     }
//! }
//! # let _ = MetricKind::Temperature;
//! ```

use thiserror_no_std::Error;

/// Result type for a single physical acquisition
pub type SensorResult<T> = Result<T, SensorError>;

/// Per-reading sensor failures
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    /// Device did not answer on its bus, or was never detected
    #[error("Sensor not present")]
    NotPresent,

    /// Device answered too late
    #[error("Sensor read timed out")]
    Timeout,

    /// Frame arrived but failed its checksum or format check
    #[error("Sensor checksum or format failure")]
    ChecksumFailure,

    /// Value is not physically plausible for the metric
    #[error("Sensor value {value} out of range")]
    OutOfRange {
        /// The rejected raw value
        value: f32,
    },
}

/// Startup configuration problems
///
/// Any of these stops the agent before the main loop starts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Dry reference must be numerically greater than wet reference
    #[error("Invalid calibration: dry reference {dry} must exceed wet reference {wet}")]
    InvalidCalibration {
        /// Configured dry reference
        dry: u32,
        /// Configured wet reference
        wet: u32,
    },

    /// A required credential or identifier is empty
    #[error("Missing required setting: {field}")]
    MissingCredential {
        /// Dotted path of the missing setting
        field: &'static str,
    },

    /// An interval is zero or inconsistent with another interval
    #[error("Invalid interval: {reason}")]
    InvalidInterval {
        /// What is wrong with it
        reason: &'static str,
    },

    /// Derived window size exceeds the compile-time window capacity
    #[error("Window of {requested} samples exceeds capacity {capacity}")]
    WindowTooLarge {
        /// Samples per publish interval
        requested: usize,
        /// `MAX_WINDOW_CAPACITY`
        capacity: usize,
    },

    /// Connection retry budget is unusable
    #[error("Invalid retry policy: {reason}")]
    InvalidRetryPolicy {
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Display failures, never fatal
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// No display attached or it failed initialisation
    #[error("Display unavailable")]
    Unavailable,

    /// Transfer to the display failed
    #[error("Display bus error")]
    Bus,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotPresent => defmt::write!(fmt, "Sensor not present"),
            Self::Timeout => defmt::write!(fmt, "Sensor timeout"),
            Self::ChecksumFailure => defmt::write!(fmt, "Sensor checksum failure"),
            Self::OutOfRange { value } => defmt::write!(fmt, "Sensor value {} out of range", value),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidCalibration { dry, wet } =>
                defmt::write!(fmt, "Calibration dry {} <= wet {}", dry, wet),
            Self::MissingCredential { field } => defmt::write!(fmt, "Missing {}", field),
            Self::InvalidInterval { reason } => defmt::write!(fmt, "Interval: {}", reason),
            Self::WindowTooLarge { requested, capacity } =>
                defmt::write!(fmt, "Window {} > {}", requested, capacity),
            Self::InvalidRetryPolicy { reason } => defmt::write!(fmt, "Retry policy: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DisplayError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Unavailable => defmt::write!(fmt, "Display unavailable"),
            Self::Bus => defmt::write!(fmt, "Display bus error"),
        }
    }
}
