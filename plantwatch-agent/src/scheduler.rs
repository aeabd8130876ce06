//! Scheduler / Loop Driver
//!
//! ## Overview
//!
//! One cooperative loop owns every component. Each iteration is a call to
//! [`Scheduler::step`] with the current time; nothing in here reads a clock
//! or sleeps, so the whole agent can be driven from a test with a fixed
//! time source.
//!
//! ```text
//! step(now)
//!   1. transport.poll          Connected ⇒ begin discovery session, announce all
//!   2. housekeeping (60 s)     health probe, memory report
//!   3. status (300 s, or on    publish device status
//!      connection change)
//!   4. sample (6 s)            read every sensor, then feed the aggregator
//!   5. per closed window       ensure discovery, publish state (retained), update display
//! ```
//!
//! ## Offline Policy
//!
//! | Policy    | Sampling while disconnected | Windows on disconnect | Averages while disconnected |
//! |-----------|-----------------------------|-----------------------|-----------------------------|
//! | `Discard` | feeds the aggregator        | kept                  | displayed, publish dropped  |
//! | `Pause`   | read, not aggregated        | reset                 | none                        |
//!
//! Under `Pause` the first average after a reconnect is built only from
//! samples taken after it.

use plantwatch_connectors::{
    BrokerLink, ConnectionState, DiscoveryPublisher, EntityKind, NetworkLink, Topics,
    TransportError, TransportEvent, TransportSession,
};
use plantwatch_core::config::{AgentConfig, OfflinePolicy};
use plantwatch_core::constants::buffers::LOW_MEMORY_WARN_BYTES;
use plantwatch_core::constants::time::LOOP_PERIOD_MS;
use plantwatch_core::time::Cadence;
use plantwatch_core::{
    Aggregator, Average, ConfigError, DisplayCapability, DisplaySink, MemoryProbe, Reading,
    SensorCapability, SensorReader, TimeSource, Timestamp,
};

use crate::status::{DeviceStatus, StatusInputs};

/// Sensor as the scheduler holds it
pub type DynSensor = Box<dyn SensorCapability>;

/// Counters since startup
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Loop iterations
    pub steps: u64,
    /// Sample ticks that ran
    pub sample_ticks: u64,
    /// Sample ticks whose readings were withheld under `Pause`
    pub paused_ticks: u64,
    /// Windows closed
    pub averages: u64,
    /// Averages delivered to the broker
    pub published: u64,
    /// Averages dropped because the broker was unreachable or the publish failed
    pub dropped: u64,
    /// Status messages delivered
    pub status_published: u64,
}

/// The agent's control loop
pub struct Scheduler<N, B, D, M>
where
    N: NetworkLink,
    B: BrokerLink,
    D: DisplayCapability,
    M: MemoryProbe,
{
    readers: Vec<SensorReader<DynSensor>>,
    aggregator: Aggregator,
    transport: TransportSession<N, B>,
    discovery: DiscoveryPublisher,
    topics: Topics,
    display: DisplaySink<D>,
    memory: M,
    policy: OfflinePolicy,

    sample: Cadence,
    housekeeping: Cadence,
    status: Cadence,

    started_at: Option<Timestamp>,
    /// Last average delivered; status and discovery traffic do not count
    last_data_publish: Option<Timestamp>,
    was_connected: bool,
    stats: SchedulerStats,
}

impl<N, B, D, M> Scheduler<N, B, D, M>
where
    N: NetworkLink,
    B: BrokerLink,
    D: DisplayCapability,
    M: MemoryProbe,
{
    /// Wire every component from a validated configuration
    ///
    /// Probes each sensor once; sensors reporting `NotPresent` are excluded
    /// from the status sensor count.
    pub fn new(
        config: &AgentConfig,
        sensors: Vec<DynSensor>,
        transport: TransportSession<N, B>,
        display: Option<D>,
        memory: M,
    ) -> Result<Self, ConfigError> {
        let calibration = config.calibration_range()?;
        let aggregator = Aggregator::new(config.window_size()?)?;

        let mut readers: Vec<SensorReader<DynSensor>> = sensors
            .into_iter()
            .map(|sensor| SensorReader::new(sensor, calibration))
            .collect();
        for reader in &mut readers {
            reader.probe();
        }

        let present = readers.iter().filter(|r| r.is_present()).count();
        log::info!(
            "{}/{} sensors present, {} samples per window, offline policy {:?}",
            present, readers.len(), aggregator.target(), config.offline_policy
        );

        let timing = &config.timing;
        Ok(Self {
            readers,
            aggregator,
            transport,
            discovery: DiscoveryPublisher::from_config(config),
            topics: Topics::from(config),
            display: DisplaySink::new(display, timing.stale_after_ms()),
            memory,
            policy: config.offline_policy,
            sample: Cadence::new(timing.sample_interval_ms),
            housekeeping: Cadence::new(timing.housekeeping_interval_ms),
            status: Cadence::new(timing.status_interval_ms),
            started_at: None,
            last_data_publish: None,
            was_connected: false,
            stats: SchedulerStats::default(),
        })
    }

    /// One loop iteration
    pub fn step(&mut self, now: Timestamp) {
        self.started_at.get_or_insert(now);
        self.stats.steps += 1;

        match self.transport.poll(now) {
            Some(TransportEvent::Connected) => self.on_connected(),
            Some(TransportEvent::CycleFailed { attempts }) => {
                log::warn!("broker unreachable after {} attempts, sampling continues offline", attempts);
            }
            None => {}
        }

        if self.housekeeping.poll(now) {
            self.run_housekeeping(now);
        }

        self.track_connection();

        if self.status.poll(now) {
            self.publish_status(now);
        }

        if self.sample.poll(now) {
            self.run_sample_tick(now);
        }
    }

    /// Loop forever: step, then sleep `LOOP_PERIOD_MS`
    pub fn run<T, S>(&mut self, clock: &T, mut sleep: S) -> !
    where
        T: TimeSource,
        S: FnMut(u64),
    {
        log::info!("entering main loop");
        loop {
            self.step(clock.now());
            sleep(LOOP_PERIOD_MS);
        }
    }

    /// Current device status
    pub fn device_status(&self, now: Timestamp) -> DeviceStatus {
        DeviceStatus::evaluate(&StatusInputs {
            network_up: self.transport.network_state() == ConnectionState::Connected,
            broker_up: self.transport.is_connected(),
            working_sensors: self.readers.iter().filter(|r| r.is_working()).count(),
            total_sensors: self.readers.iter().filter(|r| r.is_present()).count(),
            last_publish: self.last_data_publish,
            started_at: self.started_at.unwrap_or(now),
            now,
        })
    }

    /// Counters since startup
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Transport, for state inspection
    pub fn transport(&self) -> &TransportSession<N, B> {
        &self.transport
    }

    /// Aggregator, for window inspection
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Display sink, for composed lines
    pub fn display(&self) -> &DisplaySink<D> {
        &self.display
    }

    /// Sensor readers in registration order
    pub fn readers(&self) -> &[SensorReader<DynSensor>] {
        &self.readers
    }

    fn on_connected(&mut self) {
        self.discovery.begin_session();
        match self.discovery.announce_all(&mut self.transport) {
            Ok(count) => log::info!("discovery announced {} entities", count),
            Err(e) => log::warn!("discovery announcement failed: {}", e),
        }
    }

    fn track_connection(&mut self) {
        let connected = self.transport.is_connected();
        if connected == self.was_connected {
            return;
        }

        if !connected && self.policy == OfflinePolicy::Pause {
            log::info!("broker lost, discarding in-flight windows");
            self.aggregator.reset();
        }
        log::info!("broker {}", self.transport.state().as_str());
        self.was_connected = connected;
        self.status.force();
    }

    fn run_housekeeping(&mut self, now: Timestamp) {
        let was_connected = self.transport.is_connected();
        if !self.transport.check_health(now) && was_connected {
            log::warn!("connection check failed, reconnecting on next poll");
        }

        if let Some(free) = self.memory.free_bytes() {
            let allocated = self.memory.allocated_bytes().unwrap_or(0);
            if free < LOW_MEMORY_WARN_BYTES {
                log::warn!("low memory: {} bytes free, {} allocated", free, allocated);
            } else {
                log::debug!("memory: {} bytes free, {} allocated", free, allocated);
            }
        }

        let stats = self.transport.stats();
        log::debug!(
            "sent={} failed={} reconnections={} failed_cycles={}",
            stats.messages_sent, stats.messages_failed, stats.reconnections, stats.failed_cycles
        );
    }

    fn publish_status(&mut self, now: Timestamp) {
        let status = self.device_status(now).to_string();
        log::info!("device status: {}", status);
        self.display.render(&status, now);

        if !self.transport.is_connected() {
            return;
        }
        match self.publish_state(EntityKind::Status, status.as_bytes()) {
            Ok(()) => self.stats.status_published += 1,
            Err(e) => log::warn!("status publish failed: {}", e),
        }
    }

    fn run_sample_tick(&mut self, now: Timestamp) {
        self.stats.sample_ticks += 1;

        // All reads complete before the aggregator sees any of them
        let mut readings: Vec<Reading> = Vec::new();
        for reader in &mut self.readers {
            if reader.is_present() {
                readings.extend(reader.sample(now));
            }
        }

        if self.policy == OfflinePolicy::Pause && !self.transport.is_connected() {
            self.stats.paused_ticks += 1;
            log::debug!("paused: {} readings withheld", readings.len());
            return;
        }

        let closed = self.aggregator.ingest(readings);
        if closed.is_empty() {
            return;
        }

        for average in &closed {
            self.stats.averages += 1;
            self.publish_average(average, now);
            self.display.update(*average, now);
        }

        let status = self.device_status(now).to_string();
        self.display.render(&status, now);
    }

    fn publish_average(&mut self, average: &Average, now: Timestamp) {
        let text = average.value_text();
        log::info!("{} = {} ({} samples)", average.kind, text, average.count);

        if !self.transport.is_connected() {
            self.stats.dropped += 1;
            log::debug!("offline, dropping {} average", average.kind);
            return;
        }

        match self.publish_state(EntityKind::Metric(average.kind), text.as_bytes()) {
            Ok(()) => {
                self.stats.published += 1;
                self.last_data_publish = Some(now);
            }
            Err(e) => {
                self.stats.dropped += 1;
                log::warn!("{} publish failed: {}", average.kind, e);
            }
        }
    }

    /// Discovery happens-before the first state of an entity in each session
    ///
    /// Metric states are retained so the hub has a value right after it
    /// restarts; the status is not.
    fn publish_state(&mut self, entity: EntityKind, payload: &[u8]) -> Result<(), TransportError> {
        self.discovery.ensure_announced(&mut self.transport, entity)?;
        let topic = self.topics.state(entity.slug());
        let retain = matches!(entity, EntityKind::Metric(_));
        self.transport.publish(&topic, payload, retain)
    }
}
