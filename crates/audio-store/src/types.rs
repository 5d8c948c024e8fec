use bytes::Bytes;
use serde::Serialize;

/// MIME types accepted for upload
pub const SUPPORTED_FORMATS: [&str; 6] = [
    "audio/wav",
    "audio/mpeg",
    "audio/mp3",
    "audio/webm",
    "audio/ogg",
    "audio/m4a",
];

/// Audio file taken from the `audio` form field
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub bytes: Bytes,
    /// Name the client gave the file
    pub file_name: String,
    /// Declared content type, empty when the client sent none
    pub mime_type: String,
}

/// Parsed upload form
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub audio: Option<AudioFile>,
    pub model: Option<String>,
    /// Caller options, `{}` when absent or not valid JSON
    pub options: serde_json::Value,
}

/// Response for a stored upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    pub message: &'static str,
    pub file_id: String,
    pub file_path: String,
    pub file_name: String,
    pub file_size: usize,
    pub mime_type: String,
    pub model: String,
    pub options: serde_json::Value,
    pub uploaded_at: String,
    pub status: &'static str,
    pub metadata: UploadMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub original_name: String,
    /// Not measured yet
    pub duration: Option<f64>,
    pub transcription_ready: bool,
    pub processing_ready: bool,
}

/// Static capability descriptor served on `GET /api/generate-audio`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub message: &'static str,
    pub status: &'static str,
    pub features: [&'static str; 3],
    pub supported_formats: [&'static str; 6],
    pub max_file_size: String,
}
