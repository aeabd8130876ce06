//! Reading series generators
//!
//! Deterministic so failures reproduce; proptest covers the random inputs.

use plantwatch_core::{MetricKind, Reading, Timestamp};

/// Valid readings of `kind` at `interval_ms` spacing
pub fn series(kind: MetricKind, values: &[f32], interval_ms: u64) -> Vec<Reading> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Reading::valid(kind, *v, i as Timestamp * interval_ms))
        .collect()
}

/// Slow sinusoidal drift around `base`, like a day of greenhouse temperature
pub fn diurnal(kind: MetricKind, base: f32, amplitude: f32, samples: usize, interval_ms: u64) -> Vec<Reading> {
    (0..samples)
        .map(|i| {
            let tick = i as Timestamp * interval_ms;
            let hours = tick as f32 / 3_600_000.0;
            let value = base + amplitude * libm::sinf(2.0 * core::f32::consts::PI * hours / 24.0);
            Reading::valid(kind, value, tick)
        })
        .collect()
}

/// Replace every `nth` reading with an invalid one
pub fn with_dropouts(mut readings: Vec<Reading>, nth: usize) -> Vec<Reading> {
    for (i, reading) in readings.iter_mut().enumerate() {
        if nth > 0 && i % nth == nth - 1 {
            *reading = Reading::invalid(reading.kind, reading.tick);
        }
    }
    readings
}
