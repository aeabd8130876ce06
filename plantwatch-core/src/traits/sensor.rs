//! Sensor Capability
//!
//! One implementation per physical part. A part that measures several
//! quantities (DHT11: temperature and humidity) lists them all in `kinds`
//! and is asked once per kind per tick.

use crate::errors::SensorResult;
use crate::metric::{MetricKind, RawValue};

/// A physical sensor the pipeline can sample
///
/// ## Contract
///
/// - `read` performs exactly one acquisition and returns; no internal retries
/// - `read` must be bounded in time (bus timeout), never block indefinitely
/// - Soil moisture returns raw ADC counts; calibration happens downstream
///
/// ## Example Implementation
///
/// ```rust
/// use plantwatch_core::{MetricKind, RawValue, SensorCapability, SensorError};
///
/// struct SoilProbe {
///     last_adc: Option<u16>,
/// }
///
/// impl SensorCapability for SoilProbe {
///     fn name(&self) -> &str {
///         "soil_moisture"
///     }
///
///     fn kinds(&self) -> &[MetricKind] {
///         &[MetricKind::SoilMoisture]
///     }
///
///     fn read(&mut self, _kind: MetricKind) -> Result<RawValue, SensorError> {
///         self.last_adc.map(f32::from).ok_or(SensorError::NotPresent)
///     }
/// }
/// ```
pub trait SensorCapability {
    /// Short name used in logs and status tracking
    fn name(&self) -> &str;

    /// Metric kinds this sensor can produce
    fn kinds(&self) -> &[MetricKind];

    /// Acquire one raw value for `kind`
    fn read(&mut self, kind: MetricKind) -> SensorResult<RawValue>;

    /// Startup presence check
    ///
    /// Defaults to a throwaway read of the first kind.
    fn probe(&mut self) -> SensorResult<()> {
        match self.kinds().first().copied() {
            Some(kind) => self.read(kind).map(|_| ()),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "alloc")]
impl<S: SensorCapability + ?Sized> SensorCapability for alloc::boxed::Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kinds(&self) -> &[MetricKind] {
        (**self).kinds()
    }

    fn read(&mut self, kind: MetricKind) -> SensorResult<RawValue> {
        (**self).read(kind)
    }

    fn probe(&mut self) -> SensorResult<()> {
        (**self).probe()
    }
}
