//! Link Capabilities
//!
//! The transport never talks to a radio or a socket directly. It drives two
//! capabilities supplied by the platform:
//!
//! - [`NetworkLink`]: joins the wireless network (or reports that the host
//!   OS already has)
//! - [`BrokerLink`]: opens broker sessions and publishes on them
//!
//! A broker session is an associated type so a link can hand out whatever
//! handle its client library needs, and so a dropped session can never be
//! published on again: the transport owns it and gives it back on
//! `disconnect`.

use plantwatch_core::config::{AgentConfig, BrokerConfig, WifiConfig};

use crate::error::{NetError, TransportError};

/// Wireless credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCredentials {
    /// Network name, empty when the platform manages the link
    pub ssid: String,
    /// Pre-shared key
    pub password: String,
}

impl From<&WifiConfig> for NetworkCredentials {
    fn from(wifi: &WifiConfig) -> Self {
        Self {
            ssid: wifi.ssid.clone(),
            password: wifi.password.clone(),
        }
    }
}

/// Everything needed for one broker handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerCredentials {
    /// Hostname or IP
    pub host: String,
    /// TCP port
    pub port: u16,
    /// MQTT client identifier
    pub client_id: String,
    /// Username and password, absent for anonymous brokers
    pub login: Option<(String, String)>,
    /// Keep-alive in seconds
    pub keep_alive_secs: u16,
    /// Bound on the handshake in milliseconds
    pub connect_timeout_ms: u64,
}

impl BrokerCredentials {
    /// Credentials from the broker section, with the transport's handshake bound
    pub fn from_config(broker: &BrokerConfig, connect_timeout_ms: u64) -> Self {
        let login = if broker.username.is_empty() {
            None
        } else {
            Some((broker.username.clone(), broker.password.clone()))
        };

        Self {
            host: broker.host.clone(),
            port: broker.port,
            client_id: broker.client_id.clone(),
            login,
            keep_alive_secs: broker.keep_alive_secs,
            connect_timeout_ms,
        }
    }
}

impl From<&AgentConfig> for BrokerCredentials {
    fn from(config: &AgentConfig) -> Self {
        Self::from_config(&config.broker, config.transport.connect_timeout_ms)
    }
}

/// Wireless association
pub trait NetworkLink {
    /// Join the network; blocks for at most one association attempt
    fn associate(&mut self, credentials: &NetworkCredentials) -> Result<(), NetError>;

    /// Whether the link currently has connectivity
    fn is_associated(&mut self) -> bool;
}

/// Broker client
pub trait BrokerLink {
    /// One established broker session
    type Session;

    /// Open and authenticate a session
    fn connect(&mut self, credentials: &BrokerCredentials) -> Result<Self::Session, NetError>;

    /// Send one message at most once
    fn publish(
        &mut self,
        session: &mut Self::Session,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), NetError>;

    /// Cheap liveness probe
    fn is_alive(&mut self, session: &mut Self::Session) -> bool;

    /// Close the session; errors are irrelevant at this point
    fn disconnect(&mut self, session: Self::Session);
}

impl<N: NetworkLink + ?Sized> NetworkLink for Box<N> {
    fn associate(&mut self, credentials: &NetworkCredentials) -> Result<(), NetError> {
        (**self).associate(credentials)
    }

    fn is_associated(&mut self) -> bool {
        (**self).is_associated()
    }
}

/// Anything that can put a message on a topic
///
/// Implemented by the transport; discovery and the status reporter only
/// depend on this, which keeps them testable against a recording sink.
pub trait Publish {
    /// Send `payload` to `topic`
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError>;
}
