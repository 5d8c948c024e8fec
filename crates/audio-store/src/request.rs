use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRef, FromRequest, Multipart};
use http::StatusCode;

use crate::error::UploadError;
use crate::store::UploadStore;
use crate::types::{AudioFile, UploadRequest};

/// Extractor for the `audio` / `model` / `options` upload form
///
/// Size and type are not checked here; that is left to
/// [`crate::UploadStore::store`] so rejections follow one fixed order.
pub struct ExtractUpload(pub UploadRequest);

impl<S> FromRequest<S> for ExtractUpload
where
    S: Send + Sync,
    Arc<UploadStore>: FromRef<S>,
{
    type Rejection = UploadError;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let limit = Arc::<UploadStore>::from_ref(state).max_file_size();
        let read_error = |error: MultipartError| field_error(error, limit);

        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| UploadError::Malformed(e.body_text()))?;

        let mut upload = UploadRequest {
            options: serde_json::json!({}),
            ..UploadRequest::default()
        };

        while let Some(field) = multipart.next_field().await.map_err(read_error)? {
            let field_name = field.name().unwrap_or_default().to_owned();

            match field_name.as_str() {
                "audio" => upload.audio = read_audio(field, limit).await?,
                "model" => upload.model = Some(field.text().await.map_err(read_error)?),
                "options" => {
                    let raw = field.text().await.map_err(read_error)?;
                    upload.options = parse_options(&raw);
                }
                _ => {
                    // Skip unknown fields
                }
            }
        }

        Ok(Self(upload))
    }
}

/// Read the file part; a plain text `audio` field does not count as a file
async fn read_audio(field: Field<'_>, limit: usize) -> Result<Option<AudioFile>, UploadError> {
    let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
        return Ok(None);
    };
    let mime_type = field.content_type().unwrap_or_default().to_owned();
    let bytes = field.bytes().await.map_err(|e| field_error(e, limit))?;

    Ok(Some(AudioFile {
        bytes,
        file_name,
        mime_type,
    }))
}

/// Parse the JSON `options` field, falling back to `{}`
fn parse_options(raw: &str) -> serde_json::Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring invalid upload options");
            serde_json::json!({})
        }
    }
}

/// Map a multipart read failure, reporting `limit` for oversize bodies
fn field_error(error: MultipartError, limit: usize) -> UploadError {
    // Bodies past the router's limit surface as a multipart read failure
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { limit }
    } else {
        UploadError::Malformed(error.body_text())
    }
}
