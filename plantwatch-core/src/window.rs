//! Fixed-Capacity Averaging Window
//!
//! ## Overview
//!
//! A window collects the valid readings of one metric between two publishes.
//! It is a count-based tumbling window: once it holds `target` readings it is
//! reduced to an [`Average`] and emptied in the same call, so no caller can
//! ever observe a full window.
//!
//! ```text
//! target = 3
//!
//! push(20.0) → [20.0]              Accumulating(1)
//! push(--)   → [20.0]              invalid, ignored
//! push(21.0) → [20.0, 21.0]        Accumulating(2)
//! push(22.0) → []  ⇒ Average 21.0  Ready → Accumulating(0)
//! ```
//!
//! ## Why Count-Based?
//!
//! A time-based window would publish averages over fewer samples whenever a
//! sensor drops out, and over a partial window after a stall. Counting only
//! valid samples keeps every published average backed by the same amount of
//! evidence; a failing sensor simply publishes less often.
//!
//! ## Memory Layout
//!
//! Storage is a `heapless::Vec` of `MAX_WINDOW_CAPACITY` readings, sized at
//! compile time. The runtime `target` may be anything in `1..=capacity`.

use heapless::Vec;

use crate::constants::buffers::MAX_WINDOW_CAPACITY;
use crate::errors::ConfigError;
use crate::metric::{Average, MetricKind, Reading};

/// Readings of one metric awaiting averaging
///
/// ## Internal Invariants
///
/// - `readings.len() < target` between calls
/// - every stored reading is valid and of this window's `kind`
/// - readings are stored in arrival order
#[derive(Debug, Clone)]
pub struct Window {
    kind: MetricKind,
    target: usize,
    readings: Vec<Reading, MAX_WINDOW_CAPACITY>,
}

impl Window {
    /// Create an empty window that closes after `target` valid readings
    pub fn new(kind: MetricKind, target: usize) -> Result<Self, ConfigError> {
        if target == 0 {
            return Err(ConfigError::InvalidInterval {
                reason: "window must hold at least one sample",
            });
        }
        if target > MAX_WINDOW_CAPACITY {
            return Err(ConfigError::WindowTooLarge {
                requested: target,
                capacity: MAX_WINDOW_CAPACITY,
            });
        }

        Ok(Self { kind, target, readings: Vec::new() })
    }

    /// Add a reading; returns the average if this reading completed the window
    ///
    /// Invalid readings and readings of another metric are ignored: they do
    /// not count toward `target` and do not enter the mean.
    pub fn push(&mut self, reading: Reading) -> Option<Average> {
        if !reading.valid || reading.kind != self.kind {
            return None;
        }

        // Cannot fail: len < target <= capacity is held between calls
        if self.readings.push(reading).is_err() {
            return None;
        }

        if self.readings.len() >= self.target {
            let average = self.reduce();
            self.readings.clear();
            average
        } else {
            None
        }
    }

    /// Number of readings currently held
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when nothing is held
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings needed to close the window
    pub fn target(&self) -> usize {
        self.target
    }

    /// Metric this window collects
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Drop all held readings
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Iterate held readings, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    fn reduce(&self) -> Option<Average> {
        let first = self.readings.first()?;
        let last = self.readings.last()?;
        let count = self.readings.len();

        // Accumulate in f64: 64 lux readings near 65535 lose precision in f32
        let sum: f64 = self.readings.iter().map(|r| r.value as f64).sum();

        Some(Average {
            kind: self.kind,
            mean: (sum / count as f64) as f32,
            count,
            first_tick: first.tick,
            last_tick: last.tick,
        })
    }
}
