//! plantwatch agent
//!
//! Drives the acquisition pipeline of `plantwatch-core` and the broker
//! connectivity of `plantwatch-connectors` from a single cooperative loop.
//!
//! ```text
//!  sensors ──→ SensorReader ──→ Aggregator ──→ Average ──┬──→ TransportSession ──→ broker
//!                                                        └──→ DisplaySink
//!               Scheduler::step(now) sequences all of it, plus housekeeping and status
//! ```
//!
//! The binary (`plantwatch`) wires host adapters into the scheduler; a board
//! crate would wire its own peripherals instead.

#![deny(unsafe_code)]

pub mod host;
pub mod scheduler;
pub mod settings;
pub mod status;

pub use scheduler::{DynSensor, Scheduler, SchedulerStats};
pub use settings::{ConfigSource, LoadError};
pub use status::{DeviceStatus, StatusInputs};
