//! Sensor Reader
//!
//! Wraps one [`SensorCapability`] and turns each acquisition into a
//! [`Reading`], valid or not. The reader is where raw values become
//! engineering values:
//!
//! 1. `read(kind)` on the capability, once, no retry
//! 2. reject non-finite or implausible raw values as `OutOfRange`
//! 3. calibrate soil moisture ADC counts into a percentage
//!
//! ## Failure Tracking
//!
//! The reader counts consecutive failed ticks per sensor, so a DHT11 that
//! misses one frame costs one failure, not one per metric. Any success resets
//! the count. Transient failures are expected (a DHT11 misses roughly one frame in
//! twenty), so they are logged at debug level until the count reaches
//! `FAILURE_WARN_THRESHOLD`; from then on every failure is a warning and the
//! sensor no longer counts as working in the device status.

use heapless::Vec;

use crate::calibration::CalibrationRange;
use crate::constants::buffers::MAX_KINDS_PER_SENSOR;
use crate::constants::sensors::FAILURE_WARN_THRESHOLD;
use crate::errors::{SensorError, SensorResult};
use crate::metric::{MetricKind, RawValue, Reading};
use crate::time::Timestamp;
use crate::traits::SensorCapability;

/// One physical sensor plus its failure bookkeeping
#[derive(Debug)]
pub struct SensorReader<S> {
    sensor: S,
    calibration: CalibrationRange,
    present: bool,
    consecutive_failures: u32,
    total_failures: u64,
}

impl<S: SensorCapability> SensorReader<S> {
    /// Wrap `sensor`; soil moisture values are mapped through `calibration`
    pub fn new(sensor: S, calibration: CalibrationRange) -> Self {
        Self {
            sensor,
            calibration,
            present: true,
            consecutive_failures: 0,
            total_failures: 0,
        }
    }

    /// Startup presence check
    ///
    /// A sensor that reports `NotPresent` here is excluded from the working
    /// and total counts of the device status. Other errors leave it present;
    /// a flaky first read is not proof of absence.
    pub fn probe(&mut self) -> bool {
        match self.sensor.probe() {
            Ok(()) => {
                log_info!("{} initialized", self.sensor.name());
                self.present = true;
            }
            Err(SensorError::NotPresent) => {
                log_warn!("{} not detected", self.sensor.name());
                self.present = false;
            }
            Err(e) => {
                log_warn!("{} probe failed: {}", self.sensor.name(), e);
                self.present = true;
            }
        }
        self.present
    }

    /// Acquire one reading per supported metric
    ///
    /// Failure counters move once per tick, not once per metric: a tick in
    /// which any metric succeeded resets them, a tick in which every metric
    /// failed counts as one failure.
    pub fn sample(&mut self, tick: Timestamp) -> Vec<Reading, MAX_KINDS_PER_SENSOR> {
        let mut readings = Vec::new();
        let mut kinds: Vec<MetricKind, MAX_KINDS_PER_SENSOR> = Vec::new();
        for kind in self.sensor.kinds().iter().take(MAX_KINDS_PER_SENSOR) {
            let _ = kinds.push(*kind);
        }

        let mut succeeded = false;
        let mut last_error = None;
        for kind in kinds {
            let reading = match self.read_one(kind) {
                Ok(value) => {
                    succeeded = true;
                    Reading::valid(kind, value, tick)
                }
                Err(e) => {
                    log_debug!("{} ({}) read failed: {}", self.sensor.name(), kind, e);
                    last_error = Some(e);
                    Reading::invalid(kind, tick)
                }
            };
            // Capacity equals the number of kinds taken above
            let _ = readings.push(reading);
        }

        if succeeded {
            self.consecutive_failures = 0;
        } else if let Some(error) = last_error {
            self.record_failure(error);
        }

        readings
    }

    fn read_one(&mut self, kind: MetricKind) -> SensorResult<f32> {
        let raw: RawValue = self.sensor.read(kind)?;
        if !kind.accepts(raw) {
            return Err(SensorError::OutOfRange { value: raw });
        }

        Ok(match kind {
            MetricKind::SoilMoisture => self.calibration.percent(raw) as f32,
            _ => raw,
        })
    }

    fn record_failure(&mut self, error: SensorError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures = self.total_failures.saturating_add(1);

        if self.consecutive_failures >= FAILURE_WARN_THRESHOLD {
            log_warn!(
                "{} failed {} ticks in a row: {}",
                self.sensor.name(), self.consecutive_failures, error
            );
        }
    }

    /// Whether the startup probe found the device
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Present and failing less often than the warning threshold
    pub fn is_working(&self) -> bool {
        self.present && self.consecutive_failures < FAILURE_WARN_THRESHOLD
    }

    /// Failed ticks since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Failed ticks since startup
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Name of the wrapped sensor
    pub fn name(&self) -> &str {
        self.sensor.name()
    }

    /// Metric kinds of the wrapped sensor
    pub fn kinds(&self) -> &[MetricKind] {
        self.sensor.kinds()
    }
}
