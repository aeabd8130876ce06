//! Harness for driving the scheduler with a fixed clock
//!
//! Every fake exposes a cloneable handle, so a test keeps control of a link
//! or sensor after the scheduler has taken ownership of it.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use plantwatch_agent::Scheduler;
use plantwatch_connectors::{
    BrokerCredentials, BrokerLink, NetError, NetworkCredentials, NetworkLink, TransportSession,
};
use plantwatch_core::constants::time::LOOP_PERIOD_MS;
use plantwatch_core::time::FixedTime;
use plantwatch_core::{
    AgentConfig, DisplayCapability, DisplayError, MemoryProbe, MetricKind, RawValue,
    SensorCapability, SensorError, TimeSource, Timestamp,
};

/// Sensor whose next value is set by the test
#[derive(Clone)]
pub struct SharedSensor {
    name: &'static str,
    kinds: Vec<MetricKind>,
    value: Rc<Cell<Result<RawValue, SensorError>>>,
    reads: Rc<Cell<u32>>,
}

impl SharedSensor {
    pub fn new(name: &'static str, kind: MetricKind, value: RawValue) -> Self {
        Self {
            name,
            kinds: vec![kind],
            value: Rc::new(Cell::new(Ok(value))),
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn set(&self, value: RawValue) {
        self.value.set(Ok(value));
    }

    pub fn fail(&self, error: SensorError) {
        self.value.set(Err(error));
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl SensorCapability for SharedSensor {
    fn name(&self) -> &str {
        self.name
    }

    fn kinds(&self) -> &[MetricKind] {
        &self.kinds
    }

    fn read(&mut self, _kind: MetricKind) -> Result<RawValue, SensorError> {
        self.reads.set(self.reads.get() + 1);
        self.value.get()
    }
}

/// Network link whose association the test can drop
#[derive(Clone, Default)]
pub struct FakeNetwork(Rc<Cell<bool>>);

impl FakeNetwork {
    pub fn drop_link(&self) {
        self.0.set(false);
    }
}

impl NetworkLink for FakeNetwork {
    fn associate(&mut self, _credentials: &NetworkCredentials) -> Result<(), NetError> {
        self.0.set(true);
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.0.get()
    }
}

/// One message as the broker saw it
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub at: usize,
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

#[derive(Default)]
struct BrokerInner {
    refuse: bool,
    dead: bool,
    connects: u32,
    messages: Vec<Message>,
}

/// Broker recording every message in arrival order
#[derive(Clone, Default)]
pub struct FakeBroker(Rc<RefCell<BrokerInner>>);

impl FakeBroker {
    pub fn refuse_connects(&self, refuse: bool) {
        self.0.borrow_mut().refuse = refuse;
    }

    /// Kill the current session; detected by the next liveness probe or publish
    pub fn kill_session(&self) {
        self.0.borrow_mut().dead = true;
    }

    pub fn connects(&self) -> u32 {
        self.0.borrow().connects
    }

    pub fn messages(&self) -> Vec<Message> {
        self.0.borrow().messages.clone()
    }

    /// Payloads published to `topic`, oldest first
    pub fn payloads(&self, topic: &str) -> Vec<String> {
        self.0
            .borrow()
            .messages
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload.clone())
            .collect()
    }

    /// Position of the first message on `topic`
    pub fn first_index(&self, topic: &str) -> Option<usize> {
        self.0.borrow().messages.iter().position(|m| m.topic == topic)
    }
}

impl BrokerLink for FakeBroker {
    type Session = ();

    fn connect(&mut self, _credentials: &BrokerCredentials) -> Result<(), NetError> {
        let mut inner = self.0.borrow_mut();
        if inner.refuse {
            return Err(NetError::Refused("server unavailable".into()));
        }
        inner.connects += 1;
        inner.dead = false;
        Ok(())
    }

    fn publish(&mut self, _session: &mut (), topic: &str, payload: &[u8], retain: bool) -> Result<(), NetError> {
        let mut inner = self.0.borrow_mut();
        if inner.dead {
            return Err(NetError::Closed);
        }
        let at = inner.messages.len();
        inner.messages.push(Message {
            at,
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retain,
        });
        Ok(())
    }

    fn is_alive(&mut self, _session: &mut ()) -> bool {
        !self.0.borrow().dead
    }

    fn disconnect(&mut self, _session: ()) {}
}

/// Display keeping the last frame
#[derive(Clone, Default)]
pub struct FakeDisplay(Rc<RefCell<Vec<String>>>);

impl FakeDisplay {
    pub fn frame(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl DisplayCapability for FakeDisplay {
    fn render(&mut self, lines: &[&str]) -> Result<(), DisplayError> {
        *self.0.borrow_mut() = lines.iter().map(|l| l.to_string()).collect();
        Ok(())
    }
}

/// Memory probe with a settable free figure
#[derive(Clone, Default)]
pub struct FakeMemory {
    pub free: Rc<Cell<Option<usize>>>,
    pub probes: Rc<Cell<u32>>,
}

impl MemoryProbe for FakeMemory {
    fn free_bytes(&self) -> Option<usize> {
        self.probes.set(self.probes.get() + 1);
        self.free.get()
    }

    fn allocated_bytes(&self) -> Option<usize> {
        Some(0)
    }
}

pub type FakeScheduler = Scheduler<FakeNetwork, FakeBroker, FakeDisplay, FakeMemory>;

/// Scheduler over fakes plus the handles and clock to drive it
pub struct Harness {
    pub scheduler: FakeScheduler,
    pub clock: FixedTime,
    pub network: FakeNetwork,
    pub broker: FakeBroker,
    pub display: FakeDisplay,
    pub memory: FakeMemory,
    stepped: bool,
}

impl Harness {
    /// Build over `sensors`; the broker refuses connects if `online` is false
    pub fn new(config: &AgentConfig, sensors: Vec<SharedSensor>, online: bool) -> Self {
        let network = FakeNetwork::default();
        let broker = FakeBroker::default();
        broker.refuse_connects(!online);
        let display = FakeDisplay::default();
        let memory = FakeMemory::default();

        let transport = TransportSession::new(
            network.clone(),
            broker.clone(),
            NetworkCredentials::default(),
            BrokerCredentials::from(config),
            config.transport,
        );
        let sensors = sensors
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn SensorCapability>)
            .collect();

        let scheduler = Scheduler::new(config, sensors, transport, Some(display.clone()), memory.clone())
            .unwrap_or_else(|e| panic!("scheduler rejected config: {e}"));

        Self {
            scheduler,
            clock: FixedTime::new(0),
            network,
            broker,
            display,
            memory,
            stepped: false,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Step every loop period up to and including `until`
    pub fn run_until(&mut self, until: Timestamp) {
        if !self.stepped {
            self.stepped = true;
            self.scheduler.step(self.clock.now());
        }
        while self.clock.now() + LOOP_PERIOD_MS <= until {
            self.clock.advance(LOOP_PERIOD_MS);
            self.scheduler.step(self.clock.now());
        }
    }

    pub fn state_topic(slug: &str) -> String {
        format!("homeassistant/sensor/pico_w_01/{}/state", slug)
    }

    pub fn config_topic(slug: &str) -> String {
        format!("homeassistant/sensor/pico_w_01/{}/config", slug)
    }
}

/// Reference config with a three-sample window (6 s sampling, 18 s publishing)
pub fn three_sample_config() -> AgentConfig {
    AgentConfig::default().with_intervals(6_000, 18_000)
}
