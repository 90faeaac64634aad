//! Communication Link Error Types

use ember_model::ValidationError;
use errors::{EmberError, EmberErrorTrait, ErrorCategory};
use thiserror::Error;

use crate::transport::TransportError;

/// Result type for ember-comlink operations
pub type Result<T> = std::result::Result<T, ComlinkError>;

/// Errors from talking to the builder
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComlinkError {
    /// The job failed validation; nothing was sent
    #[error("Job is not valid:\n{0}")]
    Invalid(Box<ValidationError>),

    /// Another job request on the same session has not finished
    #[error("A job request is already in flight")]
    Busy,

    /// Connection, write or read failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The builder answered with something unusable
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Bad endpoint or client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Argument that cannot be put on the wire
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// Helper methods
impl ComlinkError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        ComlinkError::Protocol(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ComlinkError::Config(msg.into())
    }

    /// Root of the validation tree for a refused job
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ComlinkError::Invalid(root) => Some(root.as_ref()),
            _ => None,
        }
    }
}

impl From<EmberError> for ComlinkError {
    fn from(err: EmberError) -> Self {
        ComlinkError::Config(err.to_string())
    }
}

impl EmberErrorTrait for ComlinkError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "JOB_INVALID",
            Self::Busy => "REQUEST_IN_FLIGHT",
            Self::Transport(TransportError::Timeout(_)) => "TRANSPORT_TIMEOUT",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Invalid(_) | Self::InvalidArgument(_) => ErrorCategory::Validation,
            Self::Busy => ErrorCategory::ResourceBusy,
            Self::Transport(TransportError::Timeout(_)) => ErrorCategory::Timeout,
            Self::Transport(TransportError::ConfigError(_)) | Self::Config(_) => {
                ErrorCategory::Configuration
            },
            Self::Transport(_) => ErrorCategory::Connection,
            Self::Protocol(_) => ErrorCategory::Protocol,
        }
    }
}

impl From<ComlinkError> for EmberError {
    fn from(err: ComlinkError) -> Self {
        match err {
            ComlinkError::Invalid(root) => EmberError::Validation(root.to_string()),
            ComlinkError::Busy => EmberError::Busy("job submission".to_string()),
            ComlinkError::Transport(TransportError::Timeout(msg)) => EmberError::Timeout(msg),
            ComlinkError::Transport(TransportError::ConnectionFailed(reason)) => {
                EmberError::ConnectionFailed {
                    endpoint: "builder".to_string(),
                    reason,
                }
            },
            ComlinkError::Transport(TransportError::ConfigError(msg))
            | ComlinkError::Config(msg) => {
                EmberError::Configuration(msg)
            },
            ComlinkError::Transport(other) => EmberError::Communication(other.to_string()),
            ComlinkError::Protocol(msg) => EmberError::Protocol(msg),
            ComlinkError::InvalidArgument(msg) => EmberError::InvalidParameter {
                param: "job".to_string(),
                reason: msg,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(ComlinkError::Busy.category(), ErrorCategory::ResourceBusy);
        assert!(!ComlinkError::Busy.is_retryable());

        let refused = ComlinkError::from(TransportError::ConnectionFailed("refused".into()));
        assert_eq!(refused.category(), ErrorCategory::Connection);
        assert!(refused.is_retryable());
        assert_eq!(refused.log_level(), tracing::Level::WARN);

        let invalid = ComlinkError::Invalid(Box::new(ValidationError::new("the job is not valid")));
        assert_eq!(invalid.error_code(), "JOB_INVALID");
        assert_eq!(invalid.log_level(), tracing::Level::INFO);
        assert!(invalid.validation().is_some());
    }

    #[test]
    fn test_into_ember_error() {
        let err: EmberError = ComlinkError::Busy.into();
        assert!(matches!(err, EmberError::Busy(_)));

        let err: EmberError = ComlinkError::from(TransportError::Timeout("connect".into())).into();
        assert!(err.is_retryable());

        let err: EmberError = ComlinkError::protocol("empty response").into();
        assert_eq!(err.to_string(), "Protocol error: empty response");
    }
}
