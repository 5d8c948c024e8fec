#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
mod loader;
pub mod ollama;
pub mod server;
pub mod telemetry;
pub mod uploads;

use serde::Deserialize;

pub use health::*;
pub use ollama::*;
pub use server::*;
pub use telemetry::*;
pub use uploads::*;

/// Top-level homegpt configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference backend overrides
    #[serde(default)]
    pub ollama: OllamaConfig,
    /// Audio upload storage
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
