//! MQTT broker link on `rumqttc`
//!
//! Uses the synchronous client: `Client` queues requests, `Connection` is
//! the event loop and only makes progress while it is iterated. The link
//! therefore pumps the connection itself after every request, each time
//! bounded by the session's operation timeout, so nothing here blocks
//! longer than one connect timeout.
//!
//! QoS is always 0. The transport gives at-most-once delivery and a QoS 1
//! retransmit queue would only replay stale averages after a reconnect.

use std::time::{Duration, Instant};

use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions, Outgoing, Packet,
    QoS, RecvTimeoutError, TryRecvError,
};

use crate::error::NetError;
use crate::link::{BrokerCredentials, BrokerLink};

/// Requests the client may queue before `try_publish` reports backpressure
const REQUEST_CAPACITY: usize = 16;

/// One live MQTT connection
pub struct MqttSession {
    client: Client,
    connection: Connection,
    timeout: Duration,
}

impl std::fmt::Debug for MqttSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSession").field("timeout", &self.timeout).finish()
    }
}

/// Broker link over TCP
#[derive(Debug, Clone)]
pub struct MqttBrokerLink {
    clean_session: bool,
}

impl Default for MqttBrokerLink {
    fn default() -> Self {
        Self::new()
    }
}

impl MqttBrokerLink {
    /// Link with clean sessions
    pub fn new() -> Self {
        Self { clean_session: true }
    }

    /// Keep broker-side session state across reconnects
    pub fn persistent_session(mut self) -> Self {
        self.clean_session = false;
        self
    }

    fn options(&self, credentials: &BrokerCredentials) -> MqttOptions {
        let mut options = MqttOptions::new(
            credentials.client_id.clone(),
            credentials.host.clone(),
            credentials.port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(credentials.keep_alive_secs)));
        options.set_clean_session(self.clean_session);
        if let Some((username, password)) = &credentials.login {
            options.set_credentials(username.clone(), password.clone());
        }
        options
    }
}

impl BrokerLink for MqttBrokerLink {
    type Session = MqttSession;

    fn connect(&mut self, credentials: &BrokerCredentials) -> Result<MqttSession, NetError> {
        let (client, mut connection) = Client::new(self.options(credentials), REQUEST_CAPACITY);
        let timeout = Duration::from_millis(credentials.connect_timeout_ms);
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(NetError::Timeout);
            }

            match connection.recv_timeout(remaining) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    return match ack.code {
                        ConnectReturnCode::Success => {
                            log::debug!("CONNACK from {}:{}", credentials.host, credentials.port);
                            Ok(MqttSession { client, connection, timeout })
                        }
                        ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized => {
                            Err(NetError::AuthFailed)
                        }
                        code => Err(NetError::Refused(format!("{:?}", code))),
                    };
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => return Err(connection_error(e)),
                Err(RecvTimeoutError::Timeout) => return Err(NetError::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Err(NetError::Closed),
            }
        }
    }

    fn publish(
        &mut self,
        session: &mut MqttSession,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), NetError> {
        session
            .client
            .try_publish(topic, QoS::AtMostOnce, retain, payload.to_vec())
            .map_err(|e| NetError::Io(e.to_string()))?;

        // Drive the event loop until the PUBLISH has been written out
        let deadline = Instant::now() + session.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(NetError::Timeout);
            }

            match session.connection.recv_timeout(remaining) {
                Ok(Ok(Event::Outgoing(Outgoing::Publish(_)))) => return Ok(()),
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => return Err(connection_error(e)),
                Err(RecvTimeoutError::Timeout) => return Err(NetError::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Err(NetError::Closed),
            }
        }
    }

    fn is_alive(&mut self, session: &mut MqttSession) -> bool {
        // Drain whatever is pending; keep-alive pings go out as a side effect
        loop {
            match session.connection.try_recv() {
                Ok(Ok(Event::Incoming(Packet::Disconnect))) => return false,
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    log::debug!("liveness probe: {}", e);
                    return false;
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn disconnect(&mut self, mut session: MqttSession) {
        if session.client.try_disconnect().is_ok() {
            // One pass so the DISCONNECT reaches the socket
            let _ = session.connection.recv_timeout(Duration::from_millis(100));
        }
    }
}

fn connection_error(e: ConnectionError) -> NetError {
    match e {
        ConnectionError::ConnectionRefused(ConnectReturnCode::BadUserNamePassword)
        | ConnectionError::ConnectionRefused(ConnectReturnCode::NotAuthorized) => NetError::AuthFailed,
        ConnectionError::ConnectionRefused(code) => NetError::Refused(format!("{:?}", code)),
        ConnectionError::Io(e) => NetError::Io(e.to_string()),
        other => NetError::Io(other.to_string()),
    }
}
