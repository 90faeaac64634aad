//! Transport Layer Traits
//!
//! A transport moves raw bytes to and from the builder. Sessions and clients
//! speak the line protocol on top of it and never touch sockets directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transport layer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection lost
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Send operation failed
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Receive operation failed
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Connection state for transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Write side closed, still reading
    HalfClosed,
    Error,
}

/// Per-request transport statistics, logged when an exchange ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub connection_state: ConnectionState,
}

impl TransportStats {
    pub fn new() -> Self {
        Self {
            bytes_sent: 0,
            bytes_received: 0,
            connection_state: ConnectionState::Disconnected,
        }
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.connection_state = state;
    }

    pub fn record_bytes_sent(&mut self, bytes: usize) {
        self.bytes_sent += bytes as u64;
    }

    pub fn record_bytes_received(&mut self, bytes: usize) {
        self.bytes_received += bytes as u64;
    }
}

impl Default for TransportStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Core transport trait
///
/// One transport carries exactly one request: it is created, connected,
/// used and dropped.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Get transport type identifier
    fn transport_type(&self) -> &str;

    /// Connect to the remote endpoint
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Drop the connection; safe to call when not connected
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Write all of `data`, returning the number of bytes sent
    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Read whatever is available into `buffer`
    ///
    /// Waits without a time limit. `Ok(0)` means the peer closed its side.
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError>;

    /// Close the write half; the read half stays open
    async fn shutdown_write(&mut self) -> Result<(), TransportError>;

    async fn is_connected(&self) -> bool;

    async fn stats(&self) -> TransportStats;
}

/// Allows `Box<dyn Transport>` wherever a transport is expected
#[async_trait]
impl Transport for Box<dyn Transport> {
    fn transport_type(&self) -> &str {
        self.as_ref().transport_type()
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        self.as_mut().connect().await
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.as_mut().disconnect().await
    }

    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.as_mut().send(data).await
    }

    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        self.as_mut().receive(buffer).await
    }

    async fn shutdown_write(&mut self) -> Result<(), TransportError> {
        self.as_mut().shutdown_write().await
    }

    async fn is_connected(&self) -> bool {
        self.as_ref().is_connected().await
    }

    async fn stats(&self) -> TransportStats {
        self.as_ref().stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_stats() {
        let mut stats = TransportStats::new();
        assert_eq!(stats.bytes_sent, 0);
        assert_eq!(stats.connection_state, ConnectionState::Disconnected);

        stats.set_state(ConnectionState::Connected);
        stats.record_bytes_sent(100);
        stats.record_bytes_sent(20);
        stats.record_bytes_received(50);
        assert_eq!(stats.bytes_sent, 120);
        assert_eq!(stats.bytes_received, 50);
        assert_eq!(stats.connection_state, ConnectionState::Connected);
    }

    #[test]
    fn test_transport_error() {
        let error = TransportError::ConnectionFailed("refused".to_string());
        assert_eq!(error.to_string(), "Connection failed: refused");
    }
}
