//! Transport Session
//!
//! ## Overview
//!
//! Owns the network link, the broker link and the one broker session between
//! them. All state changes happen inside this module:
//!
//! | From           | Event                                   | To             |
//! |----------------|-----------------------------------------|----------------|
//! | `Disconnected` | poll, no cooldown in force              | `Connecting`   |
//! | `Connecting`   | attempt succeeds                        | `Connected`    |
//! | `Connecting`   | attempt fails, budget left              | `Connecting`   |
//! | `Connecting`   | attempt fails, budget spent             | `Disconnected` |
//! | `Connected`    | publish fails or health check fails     | `Degraded`     |
//! | `Degraded`     | poll                                    | `Connecting`   |
//!
//! ## Retry Budget
//!
//! One attempt per poll once the backoff deadline has passed. After `n`
//! failures the next attempt waits `min(base * 2^(n-1), max)`:
//!
//! ```text
//! attempt:  1    2    3    4    5     6  ...  10
//! wait(s):  -    2    4    8    16    16 ...  16
//! ```
//!
//! When the budget is spent the cycle ends: `CycleFailed` is reported once,
//! and no new cycle starts until the cooldown has elapsed. The agent keeps
//! sampling and displaying meanwhile.
//!
//! ## Time
//!
//! The session never reads a clock. `poll` and `check_health` take `now`,
//! and the most recent value stamps successful publishes.

use plantwatch_core::config::RetryConfig;
use plantwatch_core::time::Timestamp;

use crate::error::{NetError, TransportError};
use crate::link::{BrokerCredentials, BrokerLink, NetworkCredentials, NetworkLink, Publish};
use crate::ConnectionStats;

/// Lifecycle of one layer of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Idle, or cooling down after a failed cycle
    Disconnected,
    /// A connect cycle is in progress
    Connecting,
    /// Usable
    Connected,
    /// Was connected, a failure was observed, reconnect pending
    Degraded,
}

impl ConnectionState {
    /// Short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Degraded => "degraded",
        }
    }
}

/// Something the caller has to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// A broker session was just established; announce discovery now
    Connected,
    /// A connect cycle spent its whole budget
    CycleFailed {
        /// Attempts made in the cycle
        attempts: u32,
    },
}

/// Connection lifecycle and publishing over one network and one broker link
pub struct TransportSession<N: NetworkLink, B: BrokerLink> {
    network: N,
    broker: B,
    network_credentials: NetworkCredentials,
    broker_credentials: BrokerCredentials,
    retry: RetryConfig,

    session: Option<B::Session>,
    network_state: ConnectionState,
    broker_state: ConnectionState,

    attempts: u32,
    next_attempt_at: Timestamp,
    cooldown_until: Option<Timestamp>,
    ever_connected: bool,
    now: Timestamp,

    stats: ConnectionStats,
}

impl<N: NetworkLink, B: BrokerLink> TransportSession<N, B> {
    /// Idle session; nothing happens until the first `poll`
    pub fn new(
        network: N,
        broker: B,
        network_credentials: NetworkCredentials,
        broker_credentials: BrokerCredentials,
        retry: RetryConfig,
    ) -> Self {
        Self {
            network,
            broker,
            network_credentials,
            broker_credentials,
            retry,
            session: None,
            network_state: ConnectionState::Disconnected,
            broker_state: ConnectionState::Disconnected,
            attempts: 0,
            next_attempt_at: 0,
            cooldown_until: None,
            ever_connected: false,
            now: 0,
            stats: ConnectionStats::default(),
        }
    }

    /// Advance the state machine; makes at most one connect attempt
    pub fn poll(&mut self, now: Timestamp) -> Option<TransportEvent> {
        self.now = now;

        match self.broker_state {
            ConnectionState::Connected => return None,
            ConnectionState::Degraded => {
                self.drop_session();
                log::info!("broker session degraded, reconnecting");
                self.start_cycle(now);
            }
            ConnectionState::Disconnected => {
                if let Some(until) = self.cooldown_until {
                    if now < until {
                        return None;
                    }
                    self.cooldown_until = None;
                }
                self.start_cycle(now);
            }
            ConnectionState::Connecting => {}
        }

        if now < self.next_attempt_at {
            return None;
        }

        self.attempt(now)
    }

    /// Send one message; fails fast unless `Connected`
    ///
    /// A link failure moves the session to `Degraded`.
    pub fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
        if self.broker_state != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        match self.broker.publish(session, topic, payload, retain) {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += payload.len() as u64;
                self.stats.last_successful_publish = Some(self.now);
                log::debug!("published {} bytes to {}", payload.len(), topic);
                Ok(())
            }
            Err(e) => {
                self.stats.messages_failed += 1;
                self.stats.last_error = Some(e.to_string());
                log::warn!("publish to {} failed: {}", topic, e);
                self.broker_state = ConnectionState::Degraded;
                Err(TransportError::Net(e))
            }
        }
    }

    /// Probe network association and broker liveness
    ///
    /// Returns whether the session is still usable. A failed probe moves a
    /// connected session to `Degraded`.
    pub fn check_health(&mut self, now: Timestamp) -> bool {
        self.now = now;

        let associated = self.network.is_associated();
        self.network_state = if associated {
            ConnectionState::Connected
        } else if self.network_state == ConnectionState::Connected {
            ConnectionState::Degraded
        } else {
            ConnectionState::Disconnected
        };

        if self.broker_state != ConnectionState::Connected {
            return false;
        }

        if !associated {
            log::warn!("network association lost");
            self.broker_state = ConnectionState::Degraded;
            self.stats.last_error = Some("network association lost".to_string());
            return false;
        }

        let alive = match self.session.as_mut() {
            Some(session) => self.broker.is_alive(session),
            None => false,
        };
        if !alive {
            log::warn!("broker liveness check failed");
            self.broker_state = ConnectionState::Degraded;
            self.stats.last_error = Some("broker liveness check failed".to_string());
        }
        alive
    }

    /// Close the broker session, if any, and go idle
    pub fn shutdown(&mut self) {
        self.drop_session();
        self.broker_state = ConnectionState::Disconnected;
    }

    /// Broker layer state
    pub fn state(&self) -> ConnectionState {
        self.broker_state
    }

    /// Network layer state
    pub fn network_state(&self) -> ConnectionState {
        self.network_state
    }

    /// Whether publishes can currently succeed
    pub fn is_connected(&self) -> bool {
        self.broker_state == ConnectionState::Connected
    }

    /// Attempts made in the current cycle
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Milliseconds until a new cycle may start, zero outside a cooldown
    pub fn cooldown_remaining(&self, now: Timestamp) -> u64 {
        self.cooldown_until.map_or(0, |until| until.saturating_sub(now))
    }

    /// Counters since startup
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Time of the last successful publish
    pub fn last_successful_publish(&self) -> Option<Timestamp> {
        self.stats.last_successful_publish
    }

    /// Network link, for platform-specific inspection
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Broker link, for platform-specific inspection
    pub fn broker(&self) -> &B {
        &self.broker
    }

    fn start_cycle(&mut self, now: Timestamp) {
        self.broker_state = ConnectionState::Connecting;
        self.attempts = 0;
        self.next_attempt_at = now;
    }

    fn attempt(&mut self, now: Timestamp) -> Option<TransportEvent> {
        self.attempts += 1;
        log::debug!(
            "connect attempt {}/{} to {}:{}",
            self.attempts, self.retry.max_attempts,
            self.broker_credentials.host, self.broker_credentials.port
        );

        match self.connect() {
            Ok(session) => {
                self.session = Some(session);
                self.broker_state = ConnectionState::Connected;
                if self.ever_connected {
                    self.stats.reconnections += 1;
                }
                self.ever_connected = true;
                log::info!(
                    "connected to broker {}:{} after {} attempt(s)",
                    self.broker_credentials.host, self.broker_credentials.port, self.attempts
                );
                self.attempts = 0;
                Some(TransportEvent::Connected)
            }
            Err(e) => {
                self.stats.last_error = Some(e.to_string());

                if self.attempts >= self.retry.max_attempts {
                    let attempts = self.attempts;
                    self.broker_state = ConnectionState::Disconnected;
                    self.cooldown_until = Some(now.saturating_add(self.retry.cooldown_ms));
                    self.stats.failed_cycles += 1;
                    log::error!(
                        "giving up after {} attempts ({}), retrying in {} ms",
                        attempts, e, self.retry.cooldown_ms
                    );
                    Some(TransportEvent::CycleFailed { attempts })
                } else {
                    let delay = self.retry.backoff_ms(self.attempts);
                    self.next_attempt_at = now.saturating_add(delay);
                    log::warn!(
                        "connect attempt {} failed: {}, next in {} ms",
                        self.attempts, e, delay
                    );
                    None
                }
            }
        }
    }

    fn connect(&mut self) -> Result<B::Session, NetError> {
        if !self.network.is_associated() {
            self.network_state = ConnectionState::Connecting;
            if let Err(e) = self.network.associate(&self.network_credentials) {
                self.network_state = ConnectionState::Disconnected;
                return Err(e);
            }
            log::info!("network associated");
        }
        self.network_state = ConnectionState::Connected;

        self.broker.connect(&self.broker_credentials)
    }

    fn drop_session(&mut self) {
        if let Some(session) = self.session.take() {
            self.broker.disconnect(session);
        }
    }
}

impl<N: NetworkLink, B: BrokerLink> Publish for TransportSession<N, B> {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
        TransportSession::publish(self, topic, payload, retain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Online;

    impl NetworkLink for Online {
        fn associate(&mut self, _: &NetworkCredentials) -> Result<(), NetError> {
            Ok(())
        }

        fn is_associated(&mut self) -> bool {
            true
        }
    }

    /// Refuses the first `refusals` connects, then accepts
    struct Flaky {
        refusals: u32,
        fail_publish: bool,
    }

    impl BrokerLink for Flaky {
        type Session = ();

        fn connect(&mut self, _: &BrokerCredentials) -> Result<(), NetError> {
            if self.refusals > 0 {
                self.refusals -= 1;
                return Err(NetError::Refused("busy".into()));
            }
            Ok(())
        }

        fn publish(&mut self, _: &mut (), _: &str, _: &[u8], _: bool) -> Result<(), NetError> {
            if self.fail_publish {
                Err(NetError::Closed)
            } else {
                Ok(())
            }
        }

        fn is_alive(&mut self, _: &mut ()) -> bool {
            true
        }

        fn disconnect(&mut self, _: ()) {}
    }

    fn session(refusals: u32) -> TransportSession<Online, Flaky> {
        TransportSession::new(
            Online,
            Flaky { refusals, fail_publish: false },
            NetworkCredentials::default(),
            BrokerCredentials::from(&plantwatch_core::AgentConfig::default()),
            RetryConfig::default(),
        )
    }

    #[test]
    fn connects_on_first_poll() {
        let mut transport = session(0);
        assert_eq!(transport.poll(0), Some(TransportEvent::Connected));
        assert!(transport.is_connected());
        assert_eq!(transport.network_state(), ConnectionState::Connected);
        assert_eq!(transport.poll(500), None);
    }

    #[test]
    fn waits_for_backoff_between_attempts() {
        let mut transport = session(2);

        assert_eq!(transport.poll(0), None);
        assert_eq!(transport.state(), ConnectionState::Connecting);
        assert_eq!(transport.attempts(), 1);

        // second attempt only after 2 s
        assert_eq!(transport.poll(1_999), None);
        assert_eq!(transport.attempts(), 1);
        assert_eq!(transport.poll(2_000), None);
        assert_eq!(transport.attempts(), 2);

        // third attempt after a further 4 s
        assert_eq!(transport.poll(5_999), None);
        assert_eq!(transport.poll(6_000), Some(TransportEvent::Connected));
    }

    #[test]
    fn publish_requires_connection() {
        let mut transport = session(0);
        assert_eq!(transport.publish("t", b"1", false), Err(TransportError::NotConnected));
        assert_eq!(transport.stats().messages_failed, 0);
    }

    #[test]
    fn publish_failure_degrades_then_reconnects() {
        let mut transport = session(0);
        transport.poll(0);
        transport.broker.fail_publish = true;

        assert!(transport.publish("t", b"21.0", false).is_err());
        assert_eq!(transport.state(), ConnectionState::Degraded);
        assert_eq!(transport.publish("t", b"21.0", false), Err(TransportError::NotConnected));

        transport.broker.fail_publish = false;
        assert_eq!(transport.poll(500), Some(TransportEvent::Connected));
        assert_eq!(transport.stats().reconnections, 1);
    }

    #[test]
    fn successful_publish_is_counted() {
        let mut transport = session(0);
        transport.poll(1_000);
        transport.publish("t", b"21.0", false).unwrap();

        let stats = transport.stats();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.bytes_sent, 4);
        assert_eq!(stats.last_successful_publish, Some(1_000));
    }
}
