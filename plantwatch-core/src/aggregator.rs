//! Per-Metric Aggregation
//!
//! The aggregator decouples the sample cadence from the publish cadence.
//! Sensors are read often to average out noise; averages are published
//! rarely to save radio time and broker load.
//!
//! ```text
//! samples_per_window = publish_interval / sample_interval
//!                    = 60 s / 6 s = 10   (reference configuration)
//! ```
//!
//! One [`Window`] per [`MetricKind`], never shared. Each window closes on its
//! own schedule: a temperature window can close while the illuminance window,
//! whose sensor failed twice this minute, still needs two more samples.

use heapless::Vec;

use crate::constants::buffers::METRIC_COUNT;
use crate::errors::ConfigError;
use crate::metric::{Average, MetricKind, Reading};
use crate::window::Window;

/// Owner of all averaging windows
#[derive(Debug, Clone)]
pub struct Aggregator {
    windows: [Window; METRIC_COUNT],
    overflowed: u32,
}

impl Aggregator {
    /// One window per metric, each closing after `target` valid readings
    pub fn new(target: usize) -> Result<Self, ConfigError> {
        let windows = [
            Window::new(MetricKind::Temperature, target)?,
            Window::new(MetricKind::Humidity, target)?,
            Window::new(MetricKind::Illuminance, target)?,
            Window::new(MetricKind::SoilMoisture, target)?,
        ];
        Ok(Self { windows, overflowed: 0 })
    }

    /// Window size derived from the two cadences
    ///
    /// `publish_interval_ms` must be a positive multiple-or-more of
    /// `sample_interval_ms`; the remainder, if any, is dropped.
    pub fn from_intervals(sample_interval_ms: u64, publish_interval_ms: u64) -> Result<Self, ConfigError> {
        Self::new(window_size(sample_interval_ms, publish_interval_ms)?)
    }

    /// Route one reading to its window
    pub fn push(&mut self, reading: Reading) -> Option<Average> {
        let average = self.windows[reading.kind.index()].push(reading);
        if let Some(average) = &average {
            log_debug!(
                "window closed: {} mean={} over {} samples",
                average.kind, average.mean, average.count
            );
        }
        average
    }

    /// Feed one tick's readings, returning every window that closed
    ///
    /// Room is kept for one close per metric. More can only happen when
    /// several sensors feed one metric with a very small target; the extra
    /// averages are counted in [`Aggregator::overflowed`] and logged.
    pub fn ingest<I>(&mut self, readings: I) -> Vec<Average, METRIC_COUNT>
    where
        I: IntoIterator<Item = Reading>,
    {
        let mut closed = Vec::new();
        for reading in readings {
            if let Some(average) = self.push(reading) {
                if let Err(average) = closed.push(average) {
                    self.overflowed = self.overflowed.saturating_add(1);
                    log_warn!(
                        "dropping {} average {}: more than {} windows closed in one tick",
                        average.kind, average.mean, METRIC_COUNT
                    );
                }
            }
        }
        closed
    }

    /// Averages dropped because too many windows closed in one tick
    pub fn overflowed(&self) -> u32 {
        self.overflowed
    }

    /// Readings currently held for `kind`
    pub fn fill(&self, kind: MetricKind) -> usize {
        self.windows[kind.index()].len()
    }

    /// Window size shared by all metrics
    pub fn target(&self) -> usize {
        self.windows[0].target()
    }

    /// Discard every in-flight window
    pub fn reset(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
    }

    /// Window for `kind`
    pub fn window(&self, kind: MetricKind) -> &Window {
        &self.windows[kind.index()]
    }
}

/// Samples per window for the given cadences
pub fn window_size(sample_interval_ms: u64, publish_interval_ms: u64) -> Result<usize, ConfigError> {
    if sample_interval_ms == 0 {
        return Err(ConfigError::InvalidInterval {
            reason: "sample interval must be positive",
        });
    }
    if publish_interval_ms < sample_interval_ms {
        return Err(ConfigError::InvalidInterval {
            reason: "publish interval must not be shorter than sample interval",
        });
    }
    Ok((publish_interval_ms / sample_interval_ms) as usize)
}
