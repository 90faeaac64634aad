//! Transport Layer Module
//!
//! Byte transports underneath the builder protocol.
//!
//! ```text
//! JobSession / BuilderClient
//!            │
//!            ▼
//!   TransportFactory::create()
//!            │
//!      ┌─────┴─────┐
//!      ▼           ▼
//!  TcpTransport  MockTransport
//! ```

pub mod factory;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod tcp;
pub mod traits;

pub use factory::{TcpTransportFactory, TransportFactory};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockTransport, MockTransportConfig, MockTransportFactory};
pub use tcp::{TcpTransport, TcpTransportConfig};
pub use traits::{ConnectionState, Transport, TransportError, TransportStats};
