//! Metrics, Readings and Averages
//!
//! ## Lifecycle
//!
//! ```text
//! SensorCapability::read ──→ Reading ──→ Window ──→ Average ──→ transport / display
//!        (raw)              (per tick)   (owned)    (immutable, discarded after use)
//! ```
//!
//! A `Reading` is produced once per sample tick per metric. Failed reads still
//! produce a `Reading`, flagged invalid, so the tick is accounted for; windows
//! drop invalid readings on arrival.

use core::fmt::Write;

use heapless::String;

use crate::constants::buffers::VALUE_TEXT_LEN;
use crate::constants::sensors::{
    HUMIDITY_MAX_PCT, HUMIDITY_MIN_PCT, ILLUMINANCE_MAX_LX, ILLUMINANCE_MIN_LX, SOIL_RAW_MAX,
    SOIL_RAW_MIN, TEMPERATURE_MAX_C, TEMPERATURE_MIN_C,
};
use crate::time::Timestamp;

/// Raw value as delivered by a sensor capability
///
/// 16-bit ADC counts are exactly representable in `f32`.
pub type RawValue = f32;

/// The environmental quantities the device reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum MetricKind {
    /// Air temperature in °C
    Temperature = 0,
    /// Relative humidity in %
    Humidity = 1,
    /// Illuminance in lx
    Illuminance = 2,
    /// Soil moisture in %, derived from a calibrated ADC value
    SoilMoisture = 3,
}

impl MetricKind {
    /// Every kind, in publish order
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Temperature,
        MetricKind::Humidity,
        MetricKind::Illuminance,
        MetricKind::SoilMoisture,
    ];

    /// Dense index for per-metric arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Topic and entity id segment
    pub const fn slug(self) -> &'static str {
        match self {
            MetricKind::Temperature => "temperature",
            MetricKind::Humidity => "humidity",
            MetricKind::Illuminance => "lux",
            MetricKind::SoilMoisture => "soil_moisture",
        }
    }

    /// Human-readable entity name
    pub const fn display_name(self) -> &'static str {
        match self {
            MetricKind::Temperature => "Temperature",
            MetricKind::Humidity => "Humidity",
            MetricKind::Illuminance => "Light Level",
            MetricKind::SoilMoisture => "Soil Moisture",
        }
    }

    /// Unit of the published value
    pub const fn unit(self) -> &'static str {
        match self {
            MetricKind::Temperature => "°C",
            MetricKind::Humidity => "%",
            MetricKind::Illuminance => "lx",
            MetricKind::SoilMoisture => "%",
        }
    }

    /// Home Assistant device class
    pub const fn device_class(self) -> &'static str {
        match self {
            MetricKind::Temperature => "temperature",
            MetricKind::Humidity => "humidity",
            MetricKind::Illuminance => "illuminance",
            MetricKind::SoilMoisture => "moisture",
        }
    }

    /// Plausible raw range `(min, max)` before any calibration
    ///
    /// For soil moisture this is the ADC range, not a percentage.
    pub const fn raw_range(self) -> (f32, f32) {
        match self {
            MetricKind::Temperature => (TEMPERATURE_MIN_C, TEMPERATURE_MAX_C),
            MetricKind::Humidity => (HUMIDITY_MIN_PCT, HUMIDITY_MAX_PCT),
            MetricKind::Illuminance => (ILLUMINANCE_MIN_LX, ILLUMINANCE_MAX_LX),
            MetricKind::SoilMoisture => (SOIL_RAW_MIN, SOIL_RAW_MAX),
        }
    }

    /// Whether `raw` is finite and inside `raw_range`
    pub fn accepts(self, raw: RawValue) -> bool {
        let (min, max) = self.raw_range();
        raw.is_finite() && raw >= min && raw <= max
    }
}

impl core::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

/// One sample of one metric at one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Which metric this sample belongs to
    pub kind: MetricKind,
    /// Engineering value (already calibrated for soil moisture)
    pub value: f32,
    /// Scheduler time of the acquisition
    pub tick: Timestamp,
    /// False when the acquisition failed; the value is then meaningless
    pub valid: bool,
}

impl Reading {
    /// A successful sample
    pub const fn valid(kind: MetricKind, value: f32, tick: Timestamp) -> Self {
        Self { kind, value, tick, valid: true }
    }

    /// A failed sample, kept only so the tick is accounted for
    pub const fn invalid(kind: MetricKind, tick: Timestamp) -> Self {
        Self { kind, value: f32::NAN, tick, valid: false }
    }
}

/// Mean of one completed window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Average {
    /// Which metric was averaged
    pub kind: MetricKind,
    /// Arithmetic mean of the valid samples
    pub mean: f32,
    /// Number of valid samples that contributed
    pub count: usize,
    /// Tick of the oldest contributing sample
    pub first_tick: Timestamp,
    /// Tick of the newest contributing sample
    pub last_tick: Timestamp,
}

impl Average {
    /// State payload text, one decimal place
    pub fn value_text(&self) -> String<VALUE_TEXT_LEN> {
        let mut text = String::new();
        // 16 bytes holds any f32 in range for our metrics at one decimal
        let _ = write!(text, "{:.1}", self.mean);
        text
    }
}
