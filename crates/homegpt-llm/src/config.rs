//! Resolution of the effective backend configuration

use std::time::Duration;

use homegpt_config::OllamaConfig;
use serde::{Serialize, Serializer};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

const BASE_URL_ENV: &str = "OLLAMA_BASE_URL";
const MODEL_ENV: &str = "OLLAMA_MODEL";

/// Effective backend configuration of a client
///
/// Serializes as `{ "baseUrl", "model", "timeout" }` with the timeout in
/// milliseconds, which is the shape reported by the status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(serialize_with = "serialize_base_url")]
    pub base_url: Url,
    pub model: String,
    #[serde(serialize_with = "serialize_millis")]
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Resolve each field as explicit override, then environment, then default
    ///
    /// Empty environment values count as unset. An unparseable
    /// `OLLAMA_BASE_URL` is logged and ignored.
    pub fn resolve(overrides: &OllamaConfig) -> Self {
        let base_url = overrides
            .base_url
            .clone()
            .or_else(base_url_from_env)
            .unwrap_or_else(default_base_url);

        let model = overrides
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| non_empty_env(MODEL_ENV))
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        Self {
            base_url,
            model,
            timeout: overrides.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    /// Absolute URL of a backend API path such as `/api/chat`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn base_url_from_env() -> Option<Url> {
    let raw = non_empty_env(BASE_URL_ENV)?;

    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(value = %raw, error = %e, "ignoring invalid {BASE_URL_ENV}");
            None
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("valid default URL")
}

fn serialize_base_url<S: Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str().trim_end_matches('/'))
}

fn serialize_millis<S: Serializer>(timeout: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
}
