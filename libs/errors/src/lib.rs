//! Unified error handling for emberlink crates
//!
//! This module provides the error type shared by the configuration, model and
//! communication layers, plus a capability trait that crate-specific error
//! types implement to expose a common classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// EmberError - Main error type
// ============================================================================

/// Main error type shared by all emberlink crates
#[derive(Debug, Error)]
pub enum EmberError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // ======================================
    // Validation Errors
    // ======================================
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid parameter: {param}: {reason}")]
    InvalidParameter { param: String, reason: String },

    // ======================================
    // Concurrency Errors
    // ======================================
    #[error("Request already in flight: {0}")]
    Busy(String),

    // ======================================
    // Protocol & Communication Errors
    // ======================================
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Connection failed: {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Timeout waiting for response from {0}")]
    Timeout(String),

    // ======================================
    // File & I/O Errors
    // ======================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {input}: {error}")]
    ParseError { input: String, error: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using EmberError
pub type EmberResult<T> = Result<T, EmberError>;

impl EmberError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ConnectionFailed { .. } | Self::Communication(_)
        )
    }
}

// Conversion traits for common error types
impl From<serde_json::Error> for EmberError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for EmberError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

impl From<figment::Error> for EmberError {
    fn from(err: figment::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<std::num::ParseIntError> for EmberError {
    fn from(err: std::num::ParseIntError) -> Self {
        Self::Validation(format!("Invalid integer: {}", err))
    }
}

impl From<std::num::ParseFloatError> for EmberError {
    fn from(err: std::num::ParseFloatError) -> Self {
        Self::Validation(format!("Invalid float: {}", err))
    }
}

// ============================================================================
// EmberError implements EmberErrorTrait
// ============================================================================

impl EmberErrorTrait for EmberError {
    fn error_code(&self) -> &'static str {
        match self {
            // Configuration Errors
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",

            // Validation
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",

            // Concurrency
            Self::Busy(_) => "REQUEST_IN_FLIGHT",

            // Protocol & Communication Errors
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::Communication(_) => "COMMUNICATION_ERROR",
            Self::ConnectionFailed { .. } => "CONNECTION_FAILED",
            Self::Timeout(_) => "TIMEOUT",

            // File & I/O
            Self::Io(_) => "IO_ERROR",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::ParseError { .. } => "PARSE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Deserialization(_) => "DESERIALIZATION_ERROR",

            Self::Other(_) => "OTHER_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::InvalidConfig { .. } => ErrorCategory::Configuration,

            Self::Validation(_) | Self::InvalidParameter { .. } => ErrorCategory::Validation,

            Self::Busy(_) => ErrorCategory::ResourceBusy,

            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::ConnectionFailed { .. } => ErrorCategory::Connection,
            Self::Communication(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,

            Self::FileNotFound(_) => ErrorCategory::NotFound,

            Self::Io(_)
            | Self::ParseError { .. }
            | Self::Serialization(_)
            | Self::Deserialization(_) => ErrorCategory::Internal,

            Self::Other(_) => ErrorCategory::Unknown,
        }
    }
}

// ============================================================================
// Error capability trait
// ============================================================================

/// Error category enum - used for classification and log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Network,
    Timeout,

    // Job graph layer
    Validation,
    NotFound,

    // Protocol/communication layer
    Protocol,
    Connection,

    // System level
    Internal,
    ResourceBusy,

    // Others
    Unknown,
}

/// Error capability trait
///
/// Each crate keeps its own domain-specific error type (e.g. `ComlinkError`)
/// and gains a common outward-facing interface by implementing this trait.
pub trait EmberErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for CLI output and logs)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Whether a fresh request may succeed (the session itself never retries)
    fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Connection
        )
    }

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal => Level::ERROR,
            ErrorCategory::Network
            | ErrorCategory::Timeout
            | ErrorCategory::Connection
            | ErrorCategory::Protocol => Level::WARN,
            ErrorCategory::Validation | ErrorCategory::NotFound => Level::INFO,
            _ => Level::WARN,
        }
    }
}

// Tests
#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            EmberError::Busy("job".into()).error_code(),
            "REQUEST_IN_FLIGHT"
        );
        assert_eq!(
            EmberError::Protocol("bad".into()).error_code(),
            "PROTOCOL_ERROR"
        );
        assert_eq!(
            EmberError::Validation("x".into()).category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn test_error_retryable() {
        assert!(EmberError::Timeout("test".into()).is_retryable());
        assert!(EmberError::ConnectionFailed {
            endpoint: "127.0.0.1:32479".into(),
            reason: "refused".into()
        }
        .is_retryable());
        assert!(!EmberError::Busy("test".into()).is_retryable());
        assert!(!EmberError::Validation("test".into()).is_retryable());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(
            EmberError::Io(std::io::Error::other("disk")).log_level(),
            tracing::Level::ERROR
        );
        assert_eq!(
            EmberError::Validation("x".into()).log_level(),
            tracing::Level::INFO
        );
    }
}
