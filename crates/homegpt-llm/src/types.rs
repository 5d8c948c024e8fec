//! Message, option and wire types for the Ollama protocol

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Temperature applied by the chat convenience calls when the caller leaves it unset
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Speaker of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation, forwarded to the backend in caller order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling options understood by the backend
///
/// Unset fields are omitted from the wire so the backend applies its own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    /// Fill in `temperature` if unset, keeping every caller-supplied field
    #[must_use]
    pub fn with_default_temperature(self) -> Self {
        Self {
            temperature: Some(self.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            ..self
        }
    }

    /// Check every set field against its documented range
    pub fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(format!("temperature must be between 0 and 2, got {t}"));
        }

        if let Some(p) = self.top_p
            && !(0.0..=1.0).contains(&p)
        {
            return Err(format!("top_p must be between 0 and 1, got {p}"));
        }

        if self.max_tokens == Some(0) {
            return Err("max_tokens must be greater than 0".to_owned());
        }

        Ok(())
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: GenerationOptions,
}

impl OllamaChatRequest {
    /// Shape a non-streaming chat request
    ///
    /// `stream` is always `false` and `temperature` defaults to 0.7 unless
    /// the caller set it.
    pub fn new(model: impl Into<String>, messages: &[ChatMessage], options: Option<GenerationOptions>) -> Self {
        Self {
            model: model.into(),
            messages: messages.to_vec(),
            stream: false,
            options: options.unwrap_or_default().with_default_temperature(),
        }
    }
}

/// Success body of `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaChatResponse {
    pub message: OllamaResponseMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub load_duration: Option<u64>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Assistant message inside a chat response
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaResponseMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /api/generate`, forwarded exactly as the caller gave it
#[derive(Debug, Serialize)]
pub(crate) struct OllamaGenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a RawValue>,
}

/// Success body of `GET /api/tags`
#[derive(Debug, Deserialize)]
pub(crate) struct OllamaTags {
    #[serde(default)]
    pub models: Option<Vec<OllamaTag>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaTag {
    #[serde(default)]
    pub name: Option<String>,
}

impl OllamaTags {
    /// Names of listed models, skipping entries without one
    pub fn into_names(self) -> Vec<String> {
        self.models
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tag| tag.name)
            .collect()
    }
}

/// Conversation for a single prompt
pub fn prompt_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(prompt)]
}

/// Conversation for a question with optional background context
///
/// A non-empty `context` becomes a leading `Context: ...` system message.
pub fn ask_messages(question: &str, context: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        messages.push(ChatMessage::system(format!("Context: {context}")));
    }

    messages.push(ChatMessage::user(question));
    messages
}
