//! Acquisition and aggregation core for plantwatch
//!
//! Turns noisy per-tick sensor readings into stable per-metric averages.
//! Designed for microcontrollers with a single core and a few tens of KB of RAM.
//!
//! Key constraints:
//! - No heap allocation in the sampling path (windows are `heapless`)
//! - Every read is a single physical acquisition, retries are the caller's concern
//! - Invalid readings never reach an average
//!
//! ```no_run
//! use plantwatch_core::{Aggregator, MetricKind, Reading};
//!
//! let mut aggregator = Aggregator::new(3).unwrap();
//!
//! for (tick, value) in [(0, 20.0), (6_000, 21.0), (12_000, 22.0)] {
//!     if let Some(average) = aggregator.push(Reading::valid(MetricKind::Temperature, value, tick)) {
//!         assert_eq!(average.mean, 21.0);
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod macros;

pub mod aggregator;
pub mod calibration;
#[cfg(feature = "alloc")]
pub mod config;
pub mod constants;
pub mod display;
pub mod errors;
pub mod metric;
pub mod sensor;
pub mod time;
pub mod traits;
pub mod window;

// Public API
pub use aggregator::Aggregator;
pub use calibration::CalibrationRange;
#[cfg(feature = "alloc")]
pub use config::{AgentConfig, OfflinePolicy};
pub use display::DisplaySink;
pub use errors::{ConfigError, DisplayError, SensorError};
pub use metric::{Average, MetricKind, RawValue, Reading};
pub use sensor::SensorReader;
pub use time::Timestamp;
pub use traits::{DisplayCapability, MemoryProbe, SensorCapability, TimeSource};
pub use window::Window;

/// Crate version, reported as the device software version by default
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
