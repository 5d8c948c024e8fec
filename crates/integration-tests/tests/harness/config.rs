//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use homegpt_config::{Config, HealthConfig, OllamaConfig, ServerConfig, UploadConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                ollama: OllamaConfig::default(),
                uploads: UploadConfig::default(),
                telemetry: homegpt_config::TelemetryConfig::default(),
            },
        }
    }

    /// Point the gateway at a backend
    pub fn with_backend(mut self, base_url: &str) -> Self {
        self.config.ollama.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Set the default model
    pub fn with_model(mut self, model: &str) -> Self {
        self.config.ollama.model = Some(model.to_owned());
        self
    }

    /// Set the per-call deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.ollama.timeout = Some(timeout);
        self
    }

    /// Store uploads under `directory`
    pub fn with_upload_dir(mut self, directory: &Path) -> Self {
        self.config.uploads.directory = directory.to_path_buf();
        self
    }

    /// Set the largest accepted upload, in bytes
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.config.uploads.max_file_size = max_file_size;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
