use homegpt_core::{ErrorKind, HttpError};
use http::StatusCode;
use thiserror::Error;

use crate::types::SUPPORTED_FORMATS;

pub type Result<T, E = UploadError> = std::result::Result<T, E>;

/// Errors raised while accepting an audio upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// Form had no `audio` file field
    #[error("No audio file provided")]
    MissingFile,

    /// File exceeds the configured size limit
    #[error("File too large. Maximum size is {}", human_size(*limit))]
    TooLarge { limit: usize },

    /// File's MIME type is not an accepted audio format
    #[error("Unsupported file format. Supported formats: {}", SUPPORTED_FORMATS.join(", "))]
    UnsupportedType { mime_type: String },

    /// Request body is not a readable multipart form
    #[error("Invalid multipart form: {0}")]
    Malformed(String),

    /// Storage directory could not be created or written
    #[error("failed to store audio file: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError for UploadError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFile | Self::TooLarge { .. } | Self::UnsupportedType { .. } | Self::Malformed(_) => {
                ErrorKind::Validation
            }
            Self::Io(_) => ErrorKind::Unclassified,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            other => other.kind().status_code(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Io(_) => "Failed to process audio file".to_owned(),
            other => other.to_string(),
        }
    }
}

/// Render a byte count as whole mebibytes when it divides evenly, e.g. `10MB`
pub(crate) fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;

    let (whole, rest) = (bytes / MIB, bytes % MIB);

    if rest == 0 {
        format!("{whole}MB")
    } else {
        format!("{bytes} bytes")
    }
}
