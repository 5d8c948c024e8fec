use homegpt_core::{ErrorKind, HttpError};
use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the inference gateway
///
/// Each variant is classified where it is first observed; callers branch
/// on [`HttpError::kind`] rather than on message text.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input was missing, blank or malformed
    #[error("{0}")]
    Validation(String),

    /// Backend answered with a non-success status
    #[error("inference backend returned {status}")]
    BackendStatus { status: StatusCode },

    /// Backend could not be reached or sent an unreadable response
    #[error("inference backend request failed: {0}")]
    Transport(String),

    /// Deadline elapsed before the backend finished responding
    #[error("Request timeout: backend took too long to respond")]
    Timeout,

    /// Caller cancelled the operation before it completed
    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Status the backend answered with, if that is what failed
    pub const fn backend_status(&self) -> Option<StatusCode> {
        match self {
            Self::BackendStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Build the validation error listing every missing field, in order
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::Validation(format!("Missing required fields: {}", fields.join(", ")))
    }
}

impl HttpError for GatewayError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::BackendStatus { .. } | Self::Transport(_) => ErrorKind::ExternalService,
            Self::Timeout => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Unclassified,
        }
    }
}
