//! Mock Transport for Testing
//!
//! Plays back scripted response chunks and records everything written to it.
//! A [`MockTransportFactory`] hands out transports that share one write log
//! and one connection counter, so a test can inspect a whole exchange after
//! the session has dropped its transport.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::factory::TransportFactory;
use super::traits::{ConnectionState, Transport, TransportError, TransportStats};

/// Mock transport configuration
#[derive(Debug, Clone)]
pub struct MockTransportConfig {
    /// Simulated connection delay
    pub connection_delay: Duration,
    pub should_fail_connection: bool,
    pub should_fail_send: bool,
    pub should_fail_receive: bool,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            connection_delay: Duration::from_millis(10),
            should_fail_connection: false,
            should_fail_send: false,
            should_fail_receive: false,
        }
    }
}

/// Writes and connection count shared between a factory and its transports
#[derive(Debug, Default)]
struct MockShared {
    sent_data: RwLock<Vec<Vec<u8>>>,
    connections: AtomicUsize,
}

#[derive(Debug)]
struct MockTransportState {
    connected: bool,
    write_closed: bool,
    receive_queue: VecDeque<Vec<u8>>,
    stats: TransportStats,
}

/// Mock transport implementation
#[derive(Debug)]
pub struct MockTransport {
    config: MockTransportConfig,
    state: RwLock<MockTransportState>,
    shared: Arc<MockShared>,
}

impl MockTransport {
    pub fn new(config: MockTransportConfig) -> Self {
        Self::with_shared(config, VecDeque::new(), Arc::default())
    }

    fn with_shared(
        config: MockTransportConfig,
        receive_queue: VecDeque<Vec<u8>>,
        shared: Arc<MockShared>,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(MockTransportState {
                connected: false,
                write_closed: false,
                receive_queue,
                stats: TransportStats::new(),
            }),
            shared,
        }
    }

    /// Every write so far, one entry per `send`
    pub async fn sent_data(&self) -> Vec<Vec<u8>> {
        self.shared.sent_data.read().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn transport_type(&self) -> &str {
        "mock"
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        self.state.write().await.stats.set_state(ConnectionState::Connecting);
        self.shared.connections.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.config.connection_delay).await;

        let mut state = self.state.write().await;
        if self.config.should_fail_connection {
            state.stats.set_state(ConnectionState::Error);
            return Err(TransportError::ConnectionFailed(
                "Mock connection failure".to_string(),
            ));
        }
        state.connected = true;
        state.stats.set_state(ConnectionState::Connected);
        debug!("Mock transport connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.write().await;
        if state.connected {
            state.connected = false;
            state.stats.set_state(ConnectionState::Disconnected);
        }
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(TransportError::SendFailed("Not connected".to_string()));
        }
        if state.write_closed {
            return Err(TransportError::SendFailed("Write side closed".to_string()));
        }
        if self.config.should_fail_send {
            state.stats.set_state(ConnectionState::Error);
            return Err(TransportError::SendFailed("Mock send failure".to_string()));
        }
        state.stats.record_bytes_sent(data.len());
        drop(state);

        self.shared.sent_data.write().await.push(data.to_vec());
        debug!("Mock transport sent {} bytes", data.len());
        Ok(data.len())
    }

    async fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(TransportError::ReceiveFailed("Not connected".to_string()));
        }
        if self.config.should_fail_receive {
            state.stats.set_state(ConnectionState::Error);
            return Err(TransportError::ReceiveFailed(
                "Mock receive failure".to_string(),
            ));
        }

        let Some(mut data) = state.receive_queue.pop_front() else {
            // script exhausted: the peer has closed
            return Ok(0);
        };
        let n = data.len().min(buffer.len());
        buffer[..n].copy_from_slice(&data[..n]);
        if n < data.len() {
            state.receive_queue.push_front(data.split_off(n));
        }
        state.stats.record_bytes_received(n);
        Ok(n)
    }

    async fn shutdown_write(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(TransportError::SendFailed("Not connected".to_string()));
        }
        state.write_closed = true;
        state.stats.set_state(ConnectionState::HalfClosed);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.state.read().await.connected
    }

    async fn stats(&self) -> TransportStats {
        self.state.read().await.stats.clone()
    }
}

/// Factory producing mock transports that all replay the same script
#[derive(Debug, Clone, Default)]
pub struct MockTransportFactory {
    config: MockTransportConfig,
    script: Vec<Vec<u8>>,
    shared: Arc<MockShared>,
}

impl MockTransportFactory {
    pub fn new(config: MockTransportConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Chunks every new transport returns from `receive`, in order
    pub fn with_script<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        self.script = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Everything written through any transport of this factory, concatenated
    pub async fn sent_bytes(&self) -> Vec<u8> {
        self.shared.sent_data.read().await.concat()
    }

    /// Number of connection attempts across all transports
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(MockTransport::with_shared(
            self.config.clone(),
            self.script.iter().cloned().collect(),
            Arc::clone(&self.shared),
        )))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_connect_disconnect() {
        let mut transport = MockTransport::new(MockTransportConfig::default());
        assert!(!transport.is_connected().await);

        transport.connect().await.unwrap();
        assert!(transport.is_connected().await);

        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected().await);
        assert_eq!(
            transport.stats().await.connection_state,
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn test_mock_transport_send_receive() {
        let mut transport = MockTransport::with_shared(
            MockTransportConfig::default(),
            VecDeque::from([vec![1, 2, 3, 4]]),
            Arc::default(),
        );
        transport.connect().await.unwrap();

        assert_eq!(transport.send(&[0xAA, 0xBB]).await.unwrap(), 2);
        assert_eq!(transport.sent_data().await, vec![vec![0xAA, 0xBB]]);

        // a short buffer leaves the rest of the chunk queued
        let mut buffer = [0u8; 3];
        assert_eq!(transport.receive(&mut buffer).await.unwrap(), 3);
        assert_eq!(buffer, [1, 2, 3]);
        assert_eq!(transport.receive(&mut buffer).await.unwrap(), 1);
        assert_eq!(buffer[0], 4);
        assert_eq!(transport.receive(&mut buffer).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_transport_failures() {
        let config = MockTransportConfig {
            should_fail_connection: true,
            ..MockTransportConfig::default()
        };
        let mut transport = MockTransport::new(config);
        assert!(transport.connect().await.is_err());
        assert!(!transport.is_connected().await);

        let config = MockTransportConfig {
            should_fail_send: true,
            ..MockTransportConfig::default()
        };
        let mut transport = MockTransport::new(config);
        transport.connect().await.unwrap();
        assert!(matches!(
            transport.send(b"x").await,
            Err(TransportError::SendFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_no_writes_after_shutdown() {
        let mut transport = MockTransport::new(MockTransportConfig::default());
        transport.connect().await.unwrap();
        transport.shutdown_write().await.unwrap();
        assert!(transport.send(b"late").await.is_err());
        assert_eq!(
            transport.stats().await.connection_state,
            ConnectionState::HalfClosed
        );
    }

    #[tokio::test]
    async fn test_factory_shares_log_and_counter() {
        let factory = MockTransportFactory::default().with_script(["one\n"]);
        for payload in [&b"a"[..], &b"b"[..]] {
            let mut transport = factory.create().unwrap();
            transport.connect().await.unwrap();
            transport.send(payload).await.unwrap();
            let mut buffer = [0u8; 8];
            assert_eq!(transport.receive(&mut buffer).await.unwrap(), 4);
        }
        assert_eq!(factory.connections(), 2);
        assert_eq!(factory.sent_bytes().await, b"ab");
    }
}
