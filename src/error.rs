use rmcp::ErrorData as McpError;
use serde::Serialize;
use thiserror::Error;

/// Failure categories reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    UpstreamError,
}

/// Every way a tool call can fail
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Malformed or contradictory input; never retried
    #[error("{0}")]
    Validation(String),

    /// The geocoder produced no usable candidate
    #[error("{0}")]
    NotFound(String),

    /// Network failure, timeout, non-success status or malformed response
    #[error("{0}")]
    Upstream(String),
}

impl WeatherError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFoundError,
            Self::Upstream(_) => ErrorKind::UpstreamError,
        }
    }
}

/// The `{kind, message}` object attached to protocol errors
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&WeatherError> for ErrorPayload {
    fn from(err: &WeatherError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<WeatherError> for McpError {
    fn from(err: WeatherError) -> Self {
        let payload = ErrorPayload::from(&err);
        let data = serde_json::to_value(&payload).ok();
        let message = payload.message;

        match err.kind() {
            ErrorKind::ValidationError => McpError::invalid_params(message, data),
            ErrorKind::NotFoundError => McpError::resource_not_found(message, data),
            ErrorKind::UpstreamError => McpError::internal_error(message, data),
        }
    }
}
