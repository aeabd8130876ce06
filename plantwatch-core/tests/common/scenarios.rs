//! Named deployment scenarios

use plantwatch_core::CalibrationRange;

/// Calibration of the reference capacitive probe
pub fn reference_probe() -> CalibrationRange {
    CalibrationRange::default()
}

/// A probe with a narrow span, as seen on a cheap resistive fork
pub fn narrow_probe() -> CalibrationRange {
    match CalibrationRange::new(30_000, 29_000) {
        Ok(range) => range,
        Err(e) => panic!("narrow probe calibration rejected: {e}"),
    }
}

/// Raw ADC counts with their expected percentages under `reference_probe`
pub const REFERENCE_POINTS: &[(f32, u8)] = &[
    (41_000.0, 0),
    (29_500.0, 50),
    (18_000.0, 100),
    (65_535.0, 0),
    (0.0, 100),
    (35_250.0, 25),
    (23_750.0, 75),
];
