//! Broker Connectivity for plantwatch
//!
//! ## Overview
//!
//! Everything between a finished [`Average`](plantwatch_core::Average) and
//! bytes on the broker: the connection lifecycle, Home Assistant discovery,
//! topic layout and the MQTT client itself.
//!
//! ```text
//!                ┌──────────────────────┐
//!   Average ───→ │  DiscoveryPublisher  │── config (retained) ──┐
//!                └──────────────────────┘                       ▼
//!                ┌──────────────────────┐   ┌─────────────┐  ┌────────────┐
//!   state ─────→ │   TransportSession   │──→│ NetworkLink │  │ BrokerLink │──→ broker
//!                │ (retry, backoff,     │   └─────────────┘  └────────────┘
//!                │  cooldown, stats)    │──────────────────────────↑
//!                └──────────────────────┘
//! ```
//!
//! ## Connection Lifecycle
//!
//! The transport is a state machine driven by `poll(now)`. It never sleeps
//! and never reads a clock itself, so every retry path is testable with a
//! fixed time source:
//!
//! ```text
//! Disconnected ──poll──→ Connecting ──handshake ok──→ Connected
//!      ↑                     │                           │
//!      │        budget spent │            publish or     │
//!      └── cooldown ─────────┘            health fails   ▼
//!                            ↑                       Degraded
//!                            └──────── next poll ────────┘
//! ```
//!
//! ## Delivery Semantics
//!
//! At most once. A publish either reaches the broker's socket or fails
//! immediately; nothing is queued for later. An average that misses its
//! window is superseded by the next one a minute later.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use plantwatch_connectors::{DiscoveryPublisher, TransportEvent, TransportSession};
//!
//! let mut transport = TransportSession::new(network, broker, wifi, creds, retry);
//! let mut discovery = DiscoveryPublisher::from_config(&config);
//!
//! if let Some(TransportEvent::Connected) = transport.poll(now) {
//!     discovery.begin_session();
//!     discovery.announce_all(&mut transport)?;
//! }
//! ```

#![deny(unsafe_code)]

pub mod discovery;
pub mod error;
pub mod link;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod topics;
pub mod transport;

// Re-export common types
pub use discovery::{DeviceInfo, DiscoveryPayload, DiscoveryPublisher, DiscoveryRecord, EntityKind};
pub use error::{NetError, TransportError};
pub use link::{BrokerCredentials, BrokerLink, NetworkCredentials, NetworkLink, Publish};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBrokerLink, MqttSession};
pub use topics::Topics;
pub use transport::{ConnectionState, TransportEvent, TransportSession};

use plantwatch_core::Timestamp;

/// Connection statistics kept by the transport
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages the broker link rejected
    pub messages_failed: u64,
    /// Total payload bytes sent
    pub bytes_sent: u64,
    /// Successful connections after the first
    pub reconnections: u32,
    /// Connect cycles that exhausted their attempt budget
    pub failed_cycles: u32,
    /// Last error message
    pub last_error: Option<String>,
    /// Time of the most recent successful publish
    pub last_successful_publish: Option<Timestamp>,
}
