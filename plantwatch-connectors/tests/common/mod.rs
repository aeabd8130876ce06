//! Fake links for transport and discovery tests
//!
//! Each fake hands out a cloneable control handle so a test can change the
//! link's behaviour after the transport has taken ownership of it.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use plantwatch_connectors::{
    BrokerCredentials, BrokerLink, NetError, NetworkCredentials, NetworkLink, TransportSession,
};
use plantwatch_core::config::RetryConfig;
use plantwatch_core::AgentConfig;

/// One message as the broker saw it
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
    pub session: u32,
}

#[derive(Debug, Default)]
pub struct NetworkState {
    pub associated: bool,
    pub refuse: bool,
    pub associations: u32,
}

/// Wireless link that associates unless told to refuse
#[derive(Debug, Clone, Default)]
pub struct FakeNetwork(pub Rc<RefCell<NetworkState>>);

impl FakeNetwork {
    pub fn drop_link(&self) {
        self.0.borrow_mut().associated = false;
    }

    pub fn refuse(&self, refuse: bool) {
        self.0.borrow_mut().refuse = refuse;
    }

    pub fn associations(&self) -> u32 {
        self.0.borrow().associations
    }
}

impl NetworkLink for FakeNetwork {
    fn associate(&mut self, _credentials: &NetworkCredentials) -> Result<(), NetError> {
        let mut state = self.0.borrow_mut();
        if state.refuse {
            return Err(NetError::Association("no such network".into()));
        }
        state.associated = true;
        state.associations += 1;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.0.borrow().associated
    }
}

#[derive(Debug, Default)]
pub struct BrokerState {
    pub refuse_connects: bool,
    pub fail_publishes: bool,
    pub dead: bool,
    pub connects: u32,
    pub attempts: u32,
    pub disconnects: u32,
    pub sent: Vec<Sent>,
}

/// Broker that records every publish, tagged with the session it arrived on
#[derive(Debug, Clone, Default)]
pub struct RecordingBroker(pub Rc<RefCell<BrokerState>>);

impl RecordingBroker {
    pub fn refuse_connects(&self, refuse: bool) {
        self.0.borrow_mut().refuse_connects = refuse;
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.0.borrow_mut().fail_publishes = fail;
    }

    pub fn kill_sessions(&self, dead: bool) {
        self.0.borrow_mut().dead = dead;
    }

    pub fn attempts(&self) -> u32 {
        self.0.borrow().attempts
    }

    pub fn connects(&self) -> u32 {
        self.0.borrow().connects
    }

    pub fn disconnects(&self) -> u32 {
        self.0.borrow().disconnects
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.0.borrow().sent.clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.0.borrow().sent.iter().map(|s| s.topic.clone()).collect()
    }
}

impl BrokerLink for RecordingBroker {
    type Session = u32;

    fn connect(&mut self, _credentials: &BrokerCredentials) -> Result<u32, NetError> {
        let mut state = self.0.borrow_mut();
        state.attempts += 1;
        if state.refuse_connects {
            return Err(NetError::Refused("server unavailable".into()));
        }
        state.connects += 1;
        state.dead = false;
        Ok(state.connects)
    }

    fn publish(&mut self, session: &mut u32, topic: &str, payload: &[u8], retain: bool) -> Result<(), NetError> {
        let mut state = self.0.borrow_mut();
        if state.fail_publishes || state.dead {
            return Err(NetError::Closed);
        }
        state.sent.push(Sent {
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retain,
            session: *session,
        });
        Ok(())
    }

    fn is_alive(&mut self, _session: &mut u32) -> bool {
        !self.0.borrow().dead
    }

    fn disconnect(&mut self, _session: u32) {
        self.0.borrow_mut().disconnects += 1;
    }
}

pub type FakeTransport = TransportSession<FakeNetwork, RecordingBroker>;

/// Transport over fresh fakes with the default retry policy
pub fn transport() -> (FakeTransport, FakeNetwork, RecordingBroker) {
    transport_with(RetryConfig::default())
}

pub fn transport_with(retry: RetryConfig) -> (FakeTransport, FakeNetwork, RecordingBroker) {
    let network = FakeNetwork::default();
    let broker = RecordingBroker::default();
    let config = AgentConfig::default();
    let session = TransportSession::new(
        network.clone(),
        broker.clone(),
        NetworkCredentials { ssid: "greenhouse".into(), password: "hunter2".into() },
        BrokerCredentials::from(&config),
        retry,
    );
    (session, network, broker)
}
