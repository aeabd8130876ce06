//! Soil Moisture Calibration
//!
//! ## Sensor Background
//!
//! A capacitive soil probe forms one plate of a capacitor with the soil as
//! dielectric. Water raises the dielectric constant, the oscillator slows and
//! the ADC reading *drops*:
//!
//! ```text
//!  ADC
//!   ▲
//! dry ┤●
//!     │  ●
//!     │     ●
//!     │        ●
//! wet ┤           ●
//!     └──────────────▶ moisture %
//!     0              100
//! ```
//!
//! Two reference readings taken in air-dry soil and in saturated soil define
//! the line. Everything outside them is clamped: the probe cannot be drier
//! than dry or wetter than wet.
//!
//! ## Mapping
//!
//! ```text
//! clamped = clamp(raw, wet, dry)
//! percent = round((dry - clamped) * 100 / (dry - wet)), clamped to [0, 100]
//! ```
//!
//! With the default references (dry = 41000, wet = 18000) a raw reading of
//! 29500 maps to exactly 50 %.

use crate::errors::ConfigError;
use crate::metric::RawValue;

/// Dry and wet reference points for a capacitive soil probe
///
/// Constructed once at startup; `new` guarantees `dry > wet`, so the mapping
/// never has to re-check the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRange {
    dry: u32,
    wet: u32,
}

impl CalibrationRange {
    /// Validate and build a calibration
    ///
    /// A dry reference at or below the wet reference would silently invert
    /// every percentage, so it is rejected here.
    pub fn new(dry: u32, wet: u32) -> Result<Self, ConfigError> {
        if dry <= wet {
            return Err(ConfigError::InvalidCalibration { dry, wet });
        }
        Ok(Self { dry, wet })
    }

    /// ADC value in completely dry soil
    pub fn dry(&self) -> u32 {
        self.dry
    }

    /// ADC value in saturated soil
    pub fn wet(&self) -> u32 {
        self.wet
    }

    /// Convert a raw ADC value into a moisture percentage
    pub fn percent(&self, raw: RawValue) -> u8 {
        percent(raw, self.dry, self.wet)
    }
}

impl Default for CalibrationRange {
    fn default() -> Self {
        Self {
            dry: crate::constants::DEFAULT_SOIL_DRY_REFERENCE,
            wet: crate::constants::DEFAULT_SOIL_WET_REFERENCE,
        }
    }
}

/// Map `raw` onto 0-100 % between `dry_ref` (0 %) and `wet_ref` (100 %)
///
/// Assumes `dry_ref > wet_ref`; use [`CalibrationRange::new`] to enforce it.
/// A non-finite `raw` maps to 0 %.
pub fn percent(raw: RawValue, dry_ref: u32, wet_ref: u32) -> u8 {
    let dry = dry_ref as f32;
    let wet = wet_ref as f32;
    let span = dry - wet;
    if !raw.is_finite() || span <= 0.0 {
        return 0;
    }

    let clamped = raw.max(wet).min(dry);
    let scaled = libm::roundf((dry - clamped) * 100.0 / span);

    scaled.max(0.0).min(100.0) as u8
}
