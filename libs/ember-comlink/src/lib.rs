//! Ember Communication Link
//!
//! Talks to the job builder over its line protocol:
//! - **Transports**: `Transport` trait with TCP and scripted mock implementations
//! - **Job submission**: `JobSession`, single-flight per session
//! - **Simple commands**: `BuilderClient` for defaults, timezones, licenses and job administration
//!
//! # Features
//!
//! - `test-utils` - exposes `MockTransport` and `MockTransportFactory` outside this crate

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::{BuilderClient, LicenseInfo, TimezoneInfo};
pub use error::{ComlinkError, Result};
pub use protocol::{Directive, JobListKind};
pub use session::{FetchState, JobName, JobSession};
pub use transport::{
    TcpTransport, TcpTransportConfig, TcpTransportFactory, Transport, TransportError,
    TransportFactory, TransportStats,
};
