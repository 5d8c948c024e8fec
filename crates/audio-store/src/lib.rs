//! Audio upload endpoint: validates multipart uploads and stores them on disk

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod request;
mod store;
mod types;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use homegpt_core::{HttpError, error_body};

pub use error::{Result, UploadError};
pub use request::ExtractUpload;
pub use store::UploadStore;
pub use types::{AudioFile, Capabilities, StoredUpload, SUPPORTED_FORMATS, UploadMetadata, UploadRequest};

/// Build the upload store from configuration
pub fn build_store(config: &homegpt_config::Config) -> Arc<UploadStore> {
    let store = UploadStore::new(&config.uploads);

    tracing::debug!(
        directory = %config.uploads.directory.display(),
        max_file_size = store.max_file_size(),
        "audio upload store initialized"
    );

    Arc::new(store)
}

/// Create the endpoint router for audio uploads
///
/// The request body limit follows `store`'s file limit, see
/// [`UploadStore::body_limit`].
pub fn endpoint_router(store: &UploadStore) -> Router<Arc<UploadStore>> {
    Router::new()
        .route("/api/generate-audio", get(capabilities).post(upload))
        .layer(DefaultBodyLimit::max(store.body_limit()))
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "audio upload failed");
        } else {
            tracing::debug!(error = %self, "audio upload rejected");
        }

        (status, Json(error_body(&self))).into_response()
    }
}

/// Handle `GET /api/generate-audio`
#[allow(clippy::unused_async)]
async fn capabilities(State(store): State<Arc<UploadStore>>) -> Json<Capabilities> {
    Json(store.capabilities())
}

/// Handle `POST /api/generate-audio`
async fn upload(State(store): State<Arc<UploadStore>>, ExtractUpload(request): ExtractUpload) -> Result<Json<StoredUpload>> {
    let stored = store.store(request).await?;
    Ok(Json(stored))
}
