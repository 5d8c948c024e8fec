use http::StatusCode;

/// Classification attached to every failure surfaced by the gateway
///
/// Timeouts are kept distinct from unclassified failures but share their
/// 500 status on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input is missing a required field or is malformed
    Validation,
    /// Inference backend returned a non-success status or could not be reached
    ExternalService,
    /// Deadline elapsed before the backend responded
    Timeout,
    /// Anything else
    Unclassified,
}

impl ErrorKind {
    /// Status used when this kind is surfaced to a caller
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::ExternalService => StatusCode::BAD_GATEWAY,
            Self::Timeout | Self::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable tag for error bodies
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::ExternalService => "external_service_error",
            Self::Timeout => "timeout_error",
            Self::Unclassified => "unclassified_error",
        }
    }
}

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The handler layer
/// converts these into actual HTTP responses, keeping domain errors
/// decoupled from axum.
pub trait HttpError: std::error::Error {
    /// Taxonomy kind, fixed where the failure was first observed
    fn kind(&self) -> ErrorKind;

    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Machine-readable error type (e.g. `validation_error`)
    fn error_type(&self) -> &str {
        self.kind().as_str()
    }

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String {
        self.to_string()
    }
}

/// JSON body written for any classified error
pub fn error_body(error: &dyn HttpError) -> serde_json::Value {
    serde_json::json!({
        "error": error.client_message(),
        "type": error.error_type(),
    })
}
