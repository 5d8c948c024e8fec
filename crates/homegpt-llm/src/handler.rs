//! Axum route handlers for the ask, chat and generate endpoints

use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use homegpt_core::{HttpError, error_body, timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::client::OllamaClient;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::ChatMessage;

/// Build the router for `/api/ask`, `/api/chat` and `/api/generate`
///
/// `GET` on each path reports backend status, `POST` performs the call.
pub fn llm_router(client: Arc<OllamaClient>) -> Router {
    Router::new()
        .route("/api/ask", routing::get(ask_status).post(ask))
        .route("/api/chat", routing::get(chat_status).post(chat))
        .route("/api/generate", routing::get(generate_status).post(generate))
        .with_state(client)
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, error_type = self.error_type(), "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, Json(error_body(&self))).into_response()
    }
}

/// JSON body extractor whose rejections are validation errors
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = GatewayError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(GatewayError::Validation(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// Reject with the list of fields that are absent or blank after trimming
fn require(fields: &[(&'static str, Option<&str>)]) -> Result<(), GatewayError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::missing_fields(&missing))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum BackendStatus {
    Healthy,
    Unavailable,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    message: &'static str,
    status: BackendStatus,
    available_models: Vec<String>,
    config: GatewayConfig,
}

async fn status_report(client: &OllamaClient, message: &'static str) -> Json<StatusReport> {
    let (healthy, available_models) = tokio::join!(client.is_healthy(), client.list_models());

    Json(StatusReport {
        message,
        status: if healthy {
            BackendStatus::Healthy
        } else {
            BackendStatus::Unavailable
        },
        available_models,
        config: client.config(),
    })
}

// -- ask --

#[derive(Debug, Deserialize)]
struct AskBody {
    question: Option<String>,
    context: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskReply {
    message: String,
    question: String,
    timestamp: String,
}

/// Handle `POST /api/ask`
async fn ask(
    State(client): State<Arc<OllamaClient>>,
    JsonBody(body): JsonBody<AskBody>,
) -> Result<Json<AskReply>, GatewayError> {
    require(&[("question", body.question.as_deref())])?;
    let question = body.question.unwrap_or_default();

    let message = client.ask(&question, body.context.as_deref()).await?;

    Ok(Json(AskReply {
        message,
        question,
        timestamp: timestamp(),
    }))
}

/// Handle `GET /api/ask`
async fn ask_status(State(client): State<Arc<OllamaClient>>) -> Json<StatusReport> {
    status_report(&client, "Ask API endpoint - Ready to answer questions").await
}

// -- chat --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatBody {
    message: Option<String>,
    messages: Option<Vec<ChatMessage>>,
    system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatReply {
    message: String,
    user_message: String,
    timestamp: String,
    conversation_length: usize,
}

/// Handle `POST /api/chat`
///
/// The conversation sent upstream is the optional system prompt, then the
/// caller's history, then the new user message.
async fn chat(
    State(client): State<Arc<OllamaClient>>,
    JsonBody(body): JsonBody<ChatBody>,
) -> Result<Json<ChatReply>, GatewayError> {
    require(&[("message", body.message.as_deref())])?;
    let user_message = body.message.unwrap_or_default();

    let history = body.messages.unwrap_or_default();
    let mut conversation = Vec::with_capacity(history.len() + 2);

    if let Some(system_prompt) = body.system_prompt.filter(|s| !s.is_empty()) {
        conversation.push(ChatMessage::system(system_prompt));
    }
    conversation.extend(history);
    conversation.push(ChatMessage::user(user_message.clone()));

    let message = client.chat(&conversation, None).await?;

    Ok(Json(ChatReply {
        message,
        user_message,
        timestamp: timestamp(),
        conversation_length: conversation.len(),
    }))
}

/// Handle `GET /api/chat`
async fn chat_status(State(client): State<Arc<OllamaClient>>) -> Json<StatusReport> {
    status_report(&client, "Chat API endpoint - Ready for conversation").await
}

// -- generate --

#[derive(Debug, Deserialize)]
struct GenerateBody {
    model: Option<String>,
    prompt: Option<String>,
    stream: Option<bool>,
    /// Absent stays `None`, an explicit `null` is kept and forwarded
    #[serde(default, deserialize_with = "present_raw")]
    options: Option<Box<RawValue>>,
}

fn present_raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error> {
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// Handle `POST /api/generate`
///
/// The backend's payload is relayed as-is.
async fn generate(
    State(client): State<Arc<OllamaClient>>,
    JsonBody(body): JsonBody<GenerateBody>,
) -> Result<Json<Box<RawValue>>, GatewayError> {
    require(&[("model", body.model.as_deref()), ("prompt", body.prompt.as_deref())])?;

    let payload = client
        .generate_direct(
            body.model.as_deref().unwrap_or_default(),
            body.prompt.as_deref().unwrap_or_default(),
            body.stream.unwrap_or(false),
            body.options.as_deref(),
        )
        .await?;

    Ok(Json(payload))
}

/// Handle `GET /api/generate`
async fn generate_status(State(client): State<Arc<OllamaClient>>) -> Json<StatusReport> {
    status_report(&client, "Generate API endpoint - Ready to generate responses").await
}
