//! Display Sink
//!
//! Keeps the latest average of each metric and draws them, plus a status
//! line, on a small text display. The sink is strictly best-effort:
//!
//! - a render failure is logged and forgotten
//! - no display attached is not an error
//! - nothing here can delay sampling or publishing
//!
//! ```text
//! ┌────────────────┐
//! │Lux: 312.4      │
//! │Temp: 21.0C     │
//! │Humidity: 48.5% │
//! │Moisture: 50.0% │
//! │Online          │
//! └────────────────┘
//! ```
//!
//! A metric with no average yet, or whose average is older than the stale
//! limit, is drawn as `--` rather than showing a value that may be hours old.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::constants::buffers::{DISPLAY_LINES, DISPLAY_LINE_LEN, METRIC_COUNT};
use crate::metric::{Average, MetricKind};
use crate::time::{elapsed, Timestamp};
use crate::traits::DisplayCapability;

/// One rendered line
pub type DisplayLine = String<DISPLAY_LINE_LEN>;

/// Latest averages plus the display they are drawn on
#[derive(Debug)]
pub struct DisplaySink<D> {
    display: Option<D>,
    latest: [Option<(Average, Timestamp)>; METRIC_COUNT],
    stale_after_ms: u64,
    failures: u32,
}

impl<D: DisplayCapability> DisplaySink<D> {
    /// Sink drawing on `display`; averages older than `stale_after_ms` render as `--`
    pub fn new(display: Option<D>, stale_after_ms: u64) -> Self {
        Self {
            display,
            latest: [None; METRIC_COUNT],
            stale_after_ms,
            failures: 0,
        }
    }

    /// Remember `average` as the newest value of its metric
    pub fn update(&mut self, average: Average, now: Timestamp) {
        self.latest[average.kind.index()] = Some((average, now));
    }

    /// Newest average of `kind` if it is not stale at `now`
    pub fn latest(&self, kind: MetricKind, now: Timestamp) -> Option<&Average> {
        match &self.latest[kind.index()] {
            Some((average, at)) if elapsed(*at, now) <= self.stale_after_ms => Some(average),
            _ => None,
        }
    }

    /// Lines that would be drawn at `now`
    pub fn compose(&self, status: &str, now: Timestamp) -> Vec<DisplayLine, DISPLAY_LINES> {
        let mut lines = Vec::new();

        // Display order follows the panel layout, not MetricKind::ALL
        for kind in [
            MetricKind::Illuminance,
            MetricKind::Temperature,
            MetricKind::Humidity,
            MetricKind::SoilMoisture,
        ] {
            let _ = lines.push(self.metric_line(kind, now));
        }

        let mut status_line = DisplayLine::new();
        for c in status.chars() {
            if status_line.push(c).is_err() {
                break;
            }
        }
        let _ = lines.push(status_line);

        lines
    }

    /// Draw the current state; failures are logged, never returned
    pub fn render(&mut self, status: &str, now: Timestamp) {
        let lines = self.compose(status, now);

        let Some(display) = self.display.as_mut() else {
            return;
        };

        let mut refs: Vec<&str, DISPLAY_LINES> = Vec::new();
        for line in &lines {
            let _ = refs.push(line.as_str());
        }

        if let Err(e) = display.render(&refs) {
            self.failures = self.failures.saturating_add(1);
            log_warn!("display update failed: {}", e);
        }
    }

    /// Render failures since startup
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Whether a display is attached
    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    fn metric_line(&self, kind: MetricKind, now: Timestamp) -> DisplayLine {
        let (label, suffix) = match kind {
            MetricKind::Illuminance => ("Lux", ""),
            MetricKind::Temperature => ("Temp", "C"),
            MetricKind::Humidity => ("Humidity", "%"),
            MetricKind::SoilMoisture => ("Moisture", "%"),
        };

        let mut line = DisplayLine::new();
        let _ = match self.latest(kind, now) {
            Some(average) => write!(line, "{}: {:.1}{}", label, average.mean, suffix),
            None => write!(line, "{}: --", label),
        };
        line
    }
}
