//! Inference gateway client for an Ollama-compatible backend
//!
//! Shapes ask/chat/generate calls into the backend's `/api/chat` and
//! `/api/generate` protocol, enforces per-call deadlines, and classifies
//! failures into the shared error taxonomy. With the `http` feature it
//! also exposes the axum routes that front the client.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod handler;
pub mod types;

pub use client::OllamaClient;
pub use config::GatewayConfig;
pub use error::GatewayError;
#[cfg(feature = "http")]
pub use handler::llm_router;
pub use types::{ChatMessage, GenerationOptions, OllamaChatRequest, Role};
