//! Shared fixtures for the core integration tests
//!
//! - scripted sensor capabilities with deterministic read sequences
//! - reading series generators for window and calibration tests

#![allow(dead_code)]

pub mod generators;
pub mod scenarios;

use std::collections::VecDeque;

use plantwatch_core::{MetricKind, RawValue, SensorCapability, SensorError};

/// Sensor that replays a fixed queue of results per metric
///
/// Once a queue runs dry the sensor reports `Timeout`.
pub struct ScriptedSensor {
    name: &'static str,
    kinds: Vec<MetricKind>,
    queues: [VecDeque<Result<RawValue, SensorError>>; 4],
}

impl ScriptedSensor {
    pub fn new(name: &'static str, kinds: &[MetricKind]) -> Self {
        Self {
            name,
            kinds: kinds.to_vec(),
            queues: Default::default(),
        }
    }

    /// Queue successful raw values for `kind`
    pub fn values(mut self, kind: MetricKind, values: &[RawValue]) -> Self {
        self.queues[kind.index()].extend(values.iter().map(|v| Ok(*v)));
        self
    }

    /// Queue one failure for `kind`
    pub fn failure(mut self, kind: MetricKind, error: SensorError) -> Self {
        self.queues[kind.index()].push_back(Err(error));
        self
    }
}

impl SensorCapability for ScriptedSensor {
    fn name(&self) -> &str {
        self.name
    }

    fn kinds(&self) -> &[MetricKind] {
        &self.kinds
    }

    fn read(&mut self, kind: MetricKind) -> Result<RawValue, SensorError> {
        self.queues[kind.index()]
            .pop_front()
            .unwrap_or(Err(SensorError::Timeout))
    }
}
