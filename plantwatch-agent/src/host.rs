//! Host Adapters
//!
//! Stand-ins for the board peripherals so the agent runs on a workstation
//! against a real broker:
//!
//! - [`HostNetwork`]: the OS owns the network; association always succeeds
//! - [`SimulatedSensor`]: slow drift plus noise, with optional dropouts
//! - [`ConsoleDisplay`]: frames go to the log, only when they change
//! - [`HostMemoryProbe`]: `MemAvailable` from `/proc/meminfo` where present

use std::fs;

use plantwatch_connectors::{NetError, NetworkCredentials, NetworkLink};
use plantwatch_core::{
    DisplayCapability, DisplayError, MemoryProbe, MetricKind, RawValue, SensorCapability,
    SensorError,
};

use crate::scheduler::DynSensor;

/// Network link for hosts whose connectivity is managed by the OS
#[derive(Debug, Default, Clone)]
pub struct HostNetwork {
    associated: bool,
}

impl HostNetwork {
    /// Link reporting no association until the first connect attempt
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetworkLink for HostNetwork {
    fn associate(&mut self, credentials: &NetworkCredentials) -> Result<(), NetError> {
        if !credentials.ssid.is_empty() {
            log::debug!("host network manages its own link, ignoring ssid {}", credentials.ssid);
        }
        self.associated = true;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.associated
    }
}

/// Per-metric signal shape of a simulated sensor
#[derive(Debug, Clone, Copy)]
pub struct Signal {
    /// Metric produced
    pub kind: MetricKind,
    /// Centre value in raw units
    pub base: f32,
    /// Amplitude of the slow drift
    pub drift: f32,
    /// Peak noise per reading
    pub noise: f32,
}

/// Sensor producing plausible values without hardware
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    name: &'static str,
    kinds: Vec<MetricKind>,
    signals: Vec<Signal>,
    /// One read in `dropout_every` fails with a checksum error; 0 disables
    dropout_every: u32,
    reads: u32,
    seed: u32,
}

impl SimulatedSensor {
    /// Sensor named `name` producing `signals`
    pub fn new(name: &'static str, signals: &[Signal]) -> Self {
        Self {
            name,
            kinds: signals.iter().map(|s| s.kind).collect(),
            signals: signals.to_vec(),
            dropout_every: 0,
            reads: 0,
            seed: 0x2545_f491,
        }
    }

    /// Fail one read in `every`, like a single-wire sensor missing a frame
    pub fn with_dropouts(mut self, every: u32) -> Self {
        self.dropout_every = every;
        self
    }

    /// Xorshift in [-1, 1]
    fn jitter(&mut self) -> f32 {
        self.seed ^= self.seed << 13;
        self.seed ^= self.seed >> 17;
        self.seed ^= self.seed << 5;
        (self.seed as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl SensorCapability for SimulatedSensor {
    fn name(&self) -> &str {
        self.name
    }

    fn kinds(&self) -> &[MetricKind] {
        &self.kinds
    }

    fn read(&mut self, kind: MetricKind) -> Result<RawValue, SensorError> {
        let signal = *self
            .signals
            .iter()
            .find(|s| s.kind == kind)
            .ok_or(SensorError::NotPresent)?;

        self.reads = self.reads.wrapping_add(1);
        if self.dropout_every > 0 && self.reads % self.dropout_every == 0 {
            return Err(SensorError::ChecksumFailure);
        }

        // One drift period per ~1000 reads
        let phase = self.reads as f32 * core::f32::consts::TAU / 1000.0;
        Ok(signal.base + signal.drift * phase.sin() + signal.noise * self.jitter())
    }
}

/// The reference hardware set: DHT11, BH1750 and a capacitive soil probe
pub fn simulated_sensors() -> Vec<DynSensor> {
    vec![
        Box::new(
            SimulatedSensor::new(
                "dht11",
                &[
                    Signal { kind: MetricKind::Temperature, base: 21.0, drift: 3.0, noise: 0.5 },
                    Signal { kind: MetricKind::Humidity, base: 48.0, drift: 8.0, noise: 1.0 },
                ],
            )
            .with_dropouts(20),
        ),
        Box::new(SimulatedSensor::new(
            "bh1750",
            &[Signal { kind: MetricKind::Illuminance, base: 400.0, drift: 300.0, noise: 15.0 }],
        )),
        Box::new(SimulatedSensor::new(
            "soil_moisture",
            &[Signal { kind: MetricKind::SoilMoisture, base: 29_500.0, drift: 4_000.0, noise: 250.0 }],
        )),
    ]
}

/// Display that writes frames to the log
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    last: Vec<String>,
}

impl ConsoleDisplay {
    /// Empty display
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayCapability for ConsoleDisplay {
    fn render(&mut self, lines: &[&str]) -> Result<(), DisplayError> {
        if self.last.iter().map(String::as_str).eq(lines.iter().copied()) {
            return Ok(());
        }
        log::info!("[display] {}", lines.join(" | "));
        self.last = lines.iter().map(|l| l.to_string()).collect();
        Ok(())
    }
}

/// Reads available memory from procfs
#[derive(Debug, Default, Clone, Copy)]
pub struct HostMemoryProbe;

impl HostMemoryProbe {
    fn meminfo_kib(field: &str) -> Option<usize> {
        let text = fs::read_to_string("/proc/meminfo").ok()?;
        parse_meminfo(&text, field)
    }
}

impl MemoryProbe for HostMemoryProbe {
    fn free_bytes(&self) -> Option<usize> {
        Self::meminfo_kib("MemAvailable").map(|kib| kib * 1024)
    }

    fn allocated_bytes(&self) -> Option<usize> {
        let total = Self::meminfo_kib("MemTotal")?;
        let available = Self::meminfo_kib("MemAvailable")?;
        Some(total.saturating_sub(available) * 1024)
    }
}

fn parse_meminfo(text: &str, field: &str) -> Option<usize> {
    text.lines()
        .find_map(|line| line.strip_prefix(field)?.strip_prefix(':'))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kib| kib.parse().ok())
}
