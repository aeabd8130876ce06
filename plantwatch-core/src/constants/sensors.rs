//! Sensor Ranges and Failure Thresholds
//!
//! Plausibility limits for the sensors a plant monitor typically carries.
//! A reading outside these limits is rejected as `SensorError::OutOfRange`
//! before it can reach a window.

// ===== TEMPERATURE =====

/// Lowest plausible air temperature (°C).
///
/// DHT11 is specified for 0-50°C, DHT22 for -40-80°C. The wider range is
/// used so that either part can be fitted.
pub const TEMPERATURE_MIN_C: f32 = -40.0;

/// Highest plausible air temperature (°C).
pub const TEMPERATURE_MAX_C: f32 = 80.0;

// ===== HUMIDITY =====

/// Relative humidity lower bound (%).
pub const HUMIDITY_MIN_PCT: f32 = 0.0;

/// Relative humidity upper bound (%).
pub const HUMIDITY_MAX_PCT: f32 = 100.0;

// ===== ILLUMINANCE =====

/// Illuminance lower bound (lx).
pub const ILLUMINANCE_MIN_LX: f32 = 0.0;

/// Illuminance upper bound (lx).
///
/// BH1750 saturates at 65535 counts; in high resolution mode that is
/// roughly 54612 lx, the remainder is headroom for other parts.
pub const ILLUMINANCE_MAX_LX: f32 = 65_535.0;

// ===== SOIL MOISTURE (RAW ADC) =====

/// Lowest raw soil moisture sample (16-bit ADC).
pub const SOIL_RAW_MIN: f32 = 0.0;

/// Highest raw soil moisture sample (16-bit ADC).
pub const SOIL_RAW_MAX: f32 = 65_535.0;

/// ADC value of a capacitive probe in completely dry soil.
///
/// Capacitive probes read lower as moisture increases.
pub const DEFAULT_SOIL_DRY_REFERENCE: u32 = 41_000;

/// ADC value of a capacitive probe in saturated soil.
pub const DEFAULT_SOIL_WET_REFERENCE: u32 = 18_000;

// ===== FAILURE TRACKING =====

/// Consecutive failures after which a sensor counts as not working.
///
/// Below this, failures are logged at debug level only; transient DHT11
/// checksum errors are common and not worth an operator's attention.
pub const FAILURE_WARN_THRESHOLD: u32 = 5;
