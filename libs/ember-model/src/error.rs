//! Model Layer Error Types

use errors::{EmberError, EmberErrorTrait, ErrorCategory};
use thiserror::Error;

/// Result type for ember-model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Model layer errors
///
/// These cover parsing of textual values (durations, times, enum codes).
/// Job graph problems are reported as [`crate::ValidationError`] trees instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Malformed duration text
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    /// Malformed date or date-time text
    #[error("Invalid time '{0}'")]
    InvalidTime(String),

    /// Integer code outside an enumeration
    #[error("Unknown {kind} code: {code}")]
    UnknownCode { kind: &'static str, code: i32 },

    /// Value that could not be parsed for a key
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// Helper methods
impl ModelError {
    pub fn duration(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidDuration {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn value(key: impl Into<String>, value: impl Into<String>) -> Self {
        ModelError::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl EmberErrorTrait for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDuration { .. } => "INVALID_DURATION",
            Self::InvalidTime(_) => "INVALID_TIME",
            Self::UnknownCode { .. } => "UNKNOWN_CODE",
            Self::InvalidValue { .. } => "INVALID_VALUE",
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl From<ModelError> for EmberError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidValue { key, value } => EmberError::InvalidParameter {
                param: key,
                reason: format!("cannot parse '{}'", value),
            },
            other => EmberError::ParseError {
                input: other.error_code().to_string(),
                error: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_category() {
        let err = ModelError::duration("P1X", "unknown designator 'X'");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_retryable());
        assert_eq!(err.error_code(), "INVALID_DURATION");
    }

    #[test]
    fn test_into_ember_error() {
        let err: EmberError = ModelError::value("distres", "abc").into();
        assert!(matches!(
            err,
            EmberError::InvalidParameter { ref param, .. } if param == "distres"
        ));
    }
}
