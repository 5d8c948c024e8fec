//! Client for the Ollama chat, generate and tags endpoints

use std::sync::RwLock;
use std::time::Duration;

use bytes::Bytes;
use homegpt_config::OllamaConfig;
use reqwest::Client;
use serde::Serialize;
use serde_json::value::RawValue;
use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::{
    ChatMessage, GenerationOptions, OllamaChatRequest, OllamaChatResponse, OllamaGenerateRequest, OllamaTags,
    ask_messages, prompt_messages,
};

const CHAT_PATH: &str = "/api/chat";
const GENERATE_PATH: &str = "/api/generate";
const TAGS_PATH: &str = "/api/tags";

/// Deadline for the liveness probe, independent of the configured timeout
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Gateway to a single Ollama-compatible backend
///
/// One instance is shared across concurrent requests. Every backend call
/// runs under the configured deadline; when it elapses the in-flight HTTP
/// exchange is dropped, which aborts it.
pub struct OllamaClient {
    http: Client,
    config: GatewayConfig,
    model: RwLock<String>,
}

impl OllamaClient {
    /// Create a client for an already resolved configuration
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: Client::new(),
            model: RwLock::new(config.model.clone()),
            config,
        }
    }

    /// Resolve `overrides` against the environment and defaults, then create a client
    pub fn from_overrides(overrides: &OllamaConfig) -> Self {
        Self::new(GatewayConfig::resolve(overrides))
    }

    /// Snapshot of the effective configuration, including the current model
    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            model: self.model(),
            ..self.config.clone()
        }
    }

    /// Change the default model used by chat, ask and generate
    pub fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        tracing::info!(model = %model, "default model changed");

        let mut current = self.model.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *current = model;
    }

    fn model(&self) -> String {
        self.model
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Send a conversation and return the assistant's reply text
    pub async fn chat(&self, messages: &[ChatMessage], options: Option<GenerationOptions>) -> Result<String, GatewayError> {
        self.chat_with_cancel(messages, options, &CancellationToken::new()).await
    }

    /// [`Self::chat`], abandoning the call once `cancel` fires
    pub async fn chat_with_cancel(
        &self,
        messages: &[ChatMessage],
        options: Option<GenerationOptions>,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        if let Some(options) = &options {
            options.validate().map_err(GatewayError::Validation)?;
        }

        let request = OllamaChatRequest::new(self.model(), messages, options);

        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending chat request");

        let body = self.post(CHAT_PATH, &request, cancel).await?;

        let response: OllamaChatResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "backend chat response did not parse");
            GatewayError::Transport(format!("failed to parse chat response: {e}"))
        })?;

        Ok(response.message.content)
    }

    /// Send a single prompt as a one-message conversation
    pub async fn generate(&self, prompt: &str, options: Option<GenerationOptions>) -> Result<String, GatewayError> {
        self.chat(&prompt_messages(prompt), options).await
    }

    /// Answer a question, optionally grounded in background context
    pub async fn ask(&self, question: &str, context: Option<&str>) -> Result<String, GatewayError> {
        self.chat(&ask_messages(question, context), None).await
    }

    /// Call `/api/generate` with caller-chosen model and options
    ///
    /// `options` is forwarded byte-for-byte and the backend's JSON payload
    /// is returned untouched.
    pub async fn generate_direct(
        &self,
        model: &str,
        prompt: &str,
        stream: bool,
        options: Option<&RawValue>,
    ) -> Result<Box<RawValue>, GatewayError> {
        self.generate_direct_with_cancel(model, prompt, stream, options, &CancellationToken::new())
            .await
    }

    /// [`Self::generate_direct`], abandoning the call once `cancel` fires
    pub async fn generate_direct_with_cancel(
        &self,
        model: &str,
        prompt: &str,
        stream: bool,
        options: Option<&RawValue>,
        cancel: &CancellationToken,
    ) -> Result<Box<RawValue>, GatewayError> {
        let request = OllamaGenerateRequest {
            model,
            prompt,
            stream,
            options,
        };

        tracing::debug!(model, stream, "sending generate request");

        let body = self.post(GENERATE_PATH, &request, cancel).await?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "backend generate response is not JSON");
            GatewayError::Transport(format!("failed to parse generate response: {e}"))
        })
    }

    /// Probe the backend, true only on a success status within five seconds
    pub async fn is_healthy(&self) -> bool {
        let result = self
            .http
            .get(self.config.endpoint(TAGS_PATH))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "backend health probe failed");
                false
            }
        }
    }

    /// Names of the models the backend has installed
    ///
    /// Any failure is logged and reported as an empty list.
    pub async fn list_models(&self) -> Vec<String> {
        match self.fetch_tags().await {
            Ok(tags) => tags.into_names(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list backend models");
                Vec::new()
            }
        }
    }

    async fn fetch_tags(&self) -> Result<OllamaTags, GatewayError> {
        let response = self
            .http
            .get(self.config.endpoint(TAGS_PATH))
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::BackendStatus { status });
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to parse tags response: {e}")))
    }

    /// POST a JSON body and read the full success body before the deadline
    ///
    /// The deadline covers connecting, sending and reading the body. A
    /// fired `cancel` wins over both the deadline and the response; when the
    /// select returns, the exchange future is dropped and the HTTP call aborts.
    async fn post<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> Result<Bytes, GatewayError> {
        let url = self.config.endpoint(path);
        // The deadline cancels only this call's token, never the caller's
        let call = cancel.child_token();

        let exchange = async {
            let response = self.http.post(&url).json(body).send().await.map_err(|e| {
                tracing::error!(url = %url, error = %e, "backend request failed");
                GatewayError::Transport(e.to_string())
            })?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(url = %url, status = %status, "backend returned error");
                return Err(GatewayError::BackendStatus { status });
            }

            response
                .bytes()
                .await
                .map_err(|e| GatewayError::Transport(format!("failed to read response body: {e}")))
        };

        tokio::select! {
            biased;

            () = call.cancelled() => {
                tracing::debug!(url = %url, "backend call cancelled by caller");
                Err(GatewayError::Cancelled)
            }
            () = tokio::time::sleep(self.config.timeout) => {
                call.cancel();
                tracing::warn!(
                    url = %url,
                    timeout_ms = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
                    "backend call exceeded deadline, aborting"
                );
                Err(GatewayError::Timeout)
            }
            result = exchange => result,
        }
    }
}
