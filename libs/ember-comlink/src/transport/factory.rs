//! Transport Factory
//!
//! Sessions and clients never hold a connection between requests; they ask
//! a factory for a fresh transport each time.

use common::BuilderEndpoint;
use std::fmt;
use tracing::debug;

use super::tcp::{TcpTransport, TcpTransportConfig};
use super::traits::{Transport, TransportError};

/// Source of unconnected transports
pub trait TransportFactory: Send + Sync + fmt::Debug {
    /// Make one fresh, unconnected transport
    fn create(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// Factory for TCP connections to one builder
#[derive(Debug, Clone)]
pub struct TcpTransportFactory {
    config: TcpTransportConfig,
}

impl TcpTransportFactory {
    /// Validates the configuration once, up front
    pub fn new(config: TcpTransportConfig) -> Result<Self, TransportError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn for_endpoint(endpoint: &BuilderEndpoint) -> Result<Self, TransportError> {
        Self::new(TcpTransportConfig::from(endpoint))
    }

    pub fn config(&self) -> &TcpTransportConfig {
        &self.config
    }
}

impl TransportFactory for TcpTransportFactory {
    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        debug!(
            "Creating TCP transport for {}:{}",
            self.config.host, self.config.port
        );
        Ok(Box::new(TcpTransport::new(self.config.clone())?))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_factory_from_endpoint() {
        let mut endpoint = BuilderEndpoint::new("builder.local", 32480);
        endpoint.connect_timeout_secs = Some(3);
        let factory = TcpTransportFactory::for_endpoint(&endpoint).unwrap();
        assert_eq!(factory.config().port, 32480);
        assert_eq!(
            factory.config().connect_timeout,
            Some(std::time::Duration::from_secs(3))
        );
        assert_eq!(factory.create().unwrap().transport_type(), "tcp");
    }

    #[test]
    fn test_factory_rejects_bad_endpoint() {
        let endpoint = BuilderEndpoint::new("", 32479);
        assert!(matches!(
            TcpTransportFactory::for_endpoint(&endpoint),
            Err(TransportError::ConfigError(_))
        ));
    }
}
