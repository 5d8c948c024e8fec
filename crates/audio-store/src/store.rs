use std::path::{Path, PathBuf};

use homegpt_config::UploadConfig;
use homegpt_core::timestamp;
use uuid::Uuid;

use crate::error::{Result, UploadError, human_size};
use crate::types::{Capabilities, StoredUpload, SUPPORTED_FORMATS, UploadMetadata, UploadRequest};

/// Extension used when the original name has no usable one
const FALLBACK_EXTENSION: &str = "audio";

/// Smallest request body limit for the upload route (32 MiB)
const MIN_BODY_LIMIT: usize = 32 << 20;

/// Room for multipart framing and the text fields around the file
const FORM_OVERHEAD: usize = 1 << 20;

/// Validates audio uploads and writes accepted files to disk
#[derive(Debug, Clone)]
pub struct UploadStore {
    directory: PathBuf,
    max_file_size: usize,
    default_model: String,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            max_file_size: config.max_file_size,
            default_model: config.default_model.clone(),
        }
    }

    /// Largest accepted file, in bytes
    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Largest request body the upload route reads
    ///
    /// Always above the file limit, so a file over the limit still reaches
    /// the size check and a file at the limit is never cut off by the router.
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_add(FORM_OVERHEAD).max(MIN_BODY_LIMIT)
    }

    /// Describe what this endpoint accepts
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            message: "Generate Audio API endpoint - Ready to process audio files",
            status: "healthy",
            features: ["audio_upload", "temp_storage", "file_processing"],
            supported_formats: SUPPORTED_FORMATS,
            max_file_size: human_size(self.max_file_size),
        }
    }

    /// Validate and persist an upload under a fresh `{uuid}.{ext}` name
    ///
    /// Checks run as presence, then size, then type. Nothing is written
    /// unless all of them pass.
    pub async fn store(&self, request: UploadRequest) -> Result<StoredUpload> {
        let audio = request.audio.ok_or(UploadError::MissingFile)?;

        if audio.bytes.len() > self.max_file_size {
            tracing::debug!(size = audio.bytes.len(), limit = self.max_file_size, "rejecting oversized upload");
            return Err(UploadError::TooLarge {
                limit: self.max_file_size,
            });
        }

        if !SUPPORTED_FORMATS.contains(&audio.mime_type.as_str()) {
            tracing::debug!(mime_type = %audio.mime_type, "rejecting unsupported upload type");
            return Err(UploadError::UnsupportedType {
                mime_type: audio.mime_type,
            });
        }

        let file_id = Uuid::new_v4().to_string();
        let stored_name = format!("{file_id}.{}", extension_of(&audio.file_name));
        let path = self.directory.join(&stored_name);

        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(&path, &audio.bytes).await?;

        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone());

        tracing::info!(
            file_id = %file_id,
            path = %path.display(),
            size = audio.bytes.len(),
            mime_type = %audio.mime_type,
            "stored audio upload"
        );

        Ok(StoredUpload {
            message: "Audio file successfully uploaded and stored",
            file_id,
            file_path: path.display().to_string(),
            file_name: stored_name,
            file_size: audio.bytes.len(),
            mime_type: audio.mime_type,
            model,
            options: request.options,
            uploaded_at: timestamp(),
            status: "stored",
            metadata: UploadMetadata {
                original_name: audio.file_name,
                duration: None,
                transcription_ready: false,
                processing_ready: true,
            },
        })
    }
}

/// Extension of `file_name` reduced to ASCII alphanumerics
fn extension_of(file_name: &str) -> String {
    let extension: String = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if extension.is_empty() {
        FALLBACK_EXTENSION.to_owned()
    } else {
        extension
    }
}
