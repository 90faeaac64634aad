//! TCP Transport Implementation

use async_trait::async_trait;
use common::BuilderEndpoint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::traits::{ConnectionState, Transport, TransportError, TransportStats};

/// TCP transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpTransportConfig {
    pub host: String,
    pub port: u16,
    /// Connect timeout; `None` waits for the operating system
    pub connect_timeout: Option<Duration>,
    /// TCP no-delay (Nagle algorithm)
    pub no_delay: bool,
}

impl Default for TcpTransportConfig {
    fn default() -> Self {
        Self::from(&BuilderEndpoint::default())
    }
}

impl From<&BuilderEndpoint> for TcpTransportConfig {
    fn from(endpoint: &BuilderEndpoint) -> Self {
        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
            connect_timeout: endpoint.connect_timeout(),
            no_delay: true,
        }
    }
}

impl TcpTransportConfig {
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.host.trim().is_empty() {
            return Err(TransportError::ConfigError(
                "Host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(TransportError::ConfigError(
                "Port cannot be zero".to_string(),
            ));
        }

        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err(TransportError::ConfigError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TCP transport implementation
#[derive(Debug)]
pub struct TcpTransport {
    config: TcpTransportConfig,
    connection: Arc<RwLock<Option<TcpStream>>>,
    stats: Arc<RwLock<TransportStats>>,
}

impl TcpTransport {
    pub fn new(config: TcpTransportConfig) -> Result<Self, TransportError> {
        config.validate()?;

        Ok(Self {
            config,
            connection: Arc::new(RwLock::new(None)),
            stats: Arc::new(RwLock::new(TransportStats::new())),
        })
    }

    async fn open(&self, addr: &str) -> Result<TcpStream, TransportError> {
        let connect = TcpStream::connect(addr);
        let result = match self.config.connect_timeout {
            Some(limit) => match timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => {
                    let error_msg = format!("Connection to {} timed out", addr);
                    warn!("{error_msg}");
                    return Err(TransportError::Timeout(error_msg));
                },
            },
            None => connect.await,
        };
        result.map_err(|e| {
            let error_msg = format!("Failed to connect to {}: {e}", addr);
            error!("{error_msg}");
            TransportError::ConnectionFailed(error_msg)
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn transport_type(&self) -> &str {
        "tcp"
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        self.stats.write().await.set_state(ConnectionState::Connecting);

        let addr = self.config.socket_addr();
        debug!("Connecting to builder at {addr}");

        match self.open(&addr).await {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(self.config.no_delay) {
                    warn!("Failed to set TCP_NODELAY: {e}");
                }
                *self.connection.write().await = Some(stream);
                self.stats.write().await.set_state(ConnectionState::Connected);
                info!("Connected to builder at {addr}");
                Ok(())
            },
            Err(e) => {
                self.stats.write().await.set_state(ConnectionState::Error);
                Err(e)
            },
        }
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        let mut conn = self.connection.write().await;
        if conn.take().is_some() {
            drop(conn);
            self.stats.write().await.set_state(ConnectionState::Disconnected);
            debug!("Disconnected from {}", self.config.socket_addr());
        }
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut conn = self.connection.write().await;
        let Some(stream) = conn.as_mut() else {
            return Err(TransportError::SendFailed("Not connected".to_string()));
        };
        match stream.write_all(data).await {
            Ok(()) => {
                drop(conn);
                self.stats.write().await.record_bytes_sent(data.len());
                debug!("Sent {} bytes via TCP", data.len());
                Ok(data.len())
            },
            Err(e) => {
                let error_msg = format!("Failed to send data: {e}");
                error!("{error_msg}");
                *conn = None;
                drop(conn);
                self.stats.write().await.set_state(ConnectionState::Error);
                Err(TransportError::SendFailed(error_msg))
            },
        }
    }

    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        let mut conn = self.connection.write().await;
        let Some(stream) = conn.as_mut() else {
            return Err(TransportError::ReceiveFailed("Not connected".to_string()));
        };
        match stream.read(buffer).await {
            Ok(0) => {
                debug!("Builder closed the connection");
                Ok(0)
            },
            Ok(bytes_read) => {
                drop(conn);
                self.stats.write().await.record_bytes_received(bytes_read);
                debug!("Received {} bytes via TCP", bytes_read);
                Ok(bytes_read)
            },
            Err(e) => {
                let error_msg = format!("Failed to receive data: {e}");
                error!("{error_msg}");
                *conn = None;
                drop(conn);
                self.stats.write().await.set_state(ConnectionState::Error);
                Err(TransportError::ReceiveFailed(error_msg))
            },
        }
    }

    async fn shutdown_write(&mut self) -> Result<(), TransportError> {
        let mut conn = self.connection.write().await;
        let Some(stream) = conn.as_mut() else {
            return Err(TransportError::SendFailed("Not connected".to_string()));
        };
        stream
            .shutdown()
            .await
            .map_err(|e| {
                TransportError::ConnectionLost(format!("Failed to close write side: {e}"))
            })?;
        drop(conn);
        self.stats.write().await.set_state(ConnectionState::HalfClosed);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn stats(&self) -> TransportStats {
        self.stats.read().await.clone()
    }
}
