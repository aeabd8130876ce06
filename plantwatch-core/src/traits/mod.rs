//! Capability Traits
//!
//! The pipeline consumes hardware through these seams and never talks to a
//! bus or a radio directly. Board crates implement them; tests implement
//! them with scripted fakes.
//!
//! - [`sensor`] - one physical sensor, one acquisition per call
//! - [`display`] - text display and memory probe
//! - [`time`] - clock abstraction
//!
//! Network and broker capabilities live in `plantwatch-connectors`.

pub mod display;
pub mod sensor;
pub mod time;

pub use display::{DisplayCapability, MemoryProbe, NoMemoryProbe};
pub use sensor::SensorCapability;
pub use time::TimeSource;
