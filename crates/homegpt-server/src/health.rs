use axum::response::IntoResponse;
use http::StatusCode;

/// Process liveness, independent of the inference backend
#[allow(clippy::unused_async)]
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
