//! Network and transport errors
//!
//! `NetError` is what a link reports; `TransportError` is what callers of the
//! transport see. A `NetError` never escapes a connect attempt on its own:
//! it is folded into the retry state and surfaces only through publishes.

use thiserror::Error;

/// Failures reported by a network or broker link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    /// Operation did not finish in time
    #[error("Timed out")]
    Timeout,

    /// Wireless association failed
    #[error("Network association failed: {0}")]
    Association(String),

    /// Broker refused the connection
    #[error("Connection refused: {0}")]
    Refused(String),

    /// Broker rejected the credentials
    #[error("Authentication failed")]
    AuthFailed,

    /// Session was closed underneath us
    #[error("Connection closed")]
    Closed,

    /// Socket or protocol failure
    #[error("I/O error: {0}")]
    Io(String),
}

/// Failures seen by users of the transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The broker session is not established; nothing was sent
    #[error("Not connected")]
    NotConnected,

    /// The link failed while sending
    #[error(transparent)]
    Net(#[from] NetError),

    /// A payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No discovery record exists for the entity
    #[error("Unknown entity: {0}")]
    UnknownEntity(&'static str),
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Serialization(e.to_string())
    }
}
