//! Mock Ollama backend for integration tests
//!
//! Serves `/api/chat`, `/api/generate` and `/api/tags` with canned bodies,
//! records every request body, and can be started in failing, hanging,
//! unresponsive or malformed modes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use homegpt_llm::{GatewayConfig, OllamaClient};
use tokio_util::sync::CancellationToken;

/// Body returned by `POST /api/generate`, relayed verbatim by the gateway
pub const GENERATE_BODY: &str =
    r#"{"model":"llama2","created_at":"2024-01-01T00:00:00Z","response":"Rayleigh scattering.","done":true,"context":[1, 2, 3]}"#;

/// Reply content of `POST /api/chat` unless overridden
pub const DEFAULT_REPLY: &str = "Hello from the mock backend";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Every endpoint answers 500
    Failing,
    /// Chat and generate never answer
    Hanging,
    /// Tags answers 200 with a body that is not JSON
    Malformed,
    /// No endpoint ever answers, tags included
    Unresponsive,
}

/// Request seen by the mock
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: &'static str,
    pub body: String,
}

/// Mock backend listening on an ephemeral port
pub struct MockOllama {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    mode: Mode,
    reply: String,
    chat_count: AtomicU32,
    generate_count: AtomicU32,
    tags_count: AtomicU32,
    /// Hanging handlers dropped before completing
    aborted: AtomicU32,
    requests: Mutex<Vec<CapturedRequest>>,
}

impl MockOllama {
    /// Start a well-behaved backend
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Mode::Normal, DEFAULT_REPLY).await
    }

    /// Start a backend whose chat replies carry `content`
    pub async fn start_with_reply(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(Mode::Normal, content).await
    }

    /// Start a backend that answers every request with 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        Self::start_inner(Mode::Failing, DEFAULT_REPLY).await
    }

    /// Start a backend that accepts chat and generate calls but never answers
    pub async fn start_hanging() -> anyhow::Result<Self> {
        Self::start_inner(Mode::Hanging, DEFAULT_REPLY).await
    }

    /// Start a backend that accepts every request and never answers
    pub async fn start_unresponsive() -> anyhow::Result<Self> {
        Self::start_inner(Mode::Unresponsive, DEFAULT_REPLY).await
    }

    /// Start a backend whose tag listing is not valid JSON
    pub async fn start_malformed() -> anyhow::Result<Self> {
        Self::start_inner(Mode::Malformed, DEFAULT_REPLY).await
    }

    async fn start_inner(mode: Mode, reply: &str) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            mode,
            reply: reply.to_owned(),
            chat_count: AtomicU32::new(0),
            generate_count: AtomicU32::new(0),
            tags_count: AtomicU32::new(0),
            aborted: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/chat", routing::post(handle_chat))
            .route("/api/generate", routing::post(handle_generate))
            .route("/api/tags", routing::get(handle_tags))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure the gateway with
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Gateway client pointed at this mock with the default model
    pub fn client(&self) -> OllamaClient {
        self.client_with_timeout(Duration::from_secs(30))
    }

    /// Gateway client pointed at this mock with a custom deadline
    pub fn client_with_timeout(&self, timeout: Duration) -> OllamaClient {
        OllamaClient::new(GatewayConfig {
            base_url: self.base_url().parse().expect("valid URL"),
            model: "llama2".to_owned(),
            timeout,
        })
    }

    pub fn chat_count(&self) -> u32 {
        self.state.chat_count.load(Ordering::Relaxed)
    }

    pub fn generate_count(&self) -> u32 {
        self.state.generate_count.load(Ordering::Relaxed)
    }

    pub fn tags_count(&self) -> u32 {
        self.state.tags_count.load(Ordering::Relaxed)
    }

    /// Number of hanging calls the gateway abandoned
    pub fn aborted_count(&self) -> u32 {
        self.state.aborted.load(Ordering::Relaxed)
    }

    /// Wait until at least `n` hanging calls were abandoned, up to `within`
    pub async fn wait_for_aborts(&self, n: u32, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;

        while tokio::time::Instant::now() < deadline {
            if self.aborted_count() >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        self.aborted_count() >= n
    }

    /// Every captured request, in arrival order
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().expect("lock").clone()
    }

    /// Raw body of the most recent request to `path`
    pub fn last_body(&self, path: &str) -> Option<String> {
        self.requests()
            .into_iter()
            .rev()
            .find(|request| request.path == path)
            .map(|request| request.body)
    }

    /// Parsed body of the most recent request to `path`
    pub fn last_json(&self, path: &str) -> serde_json::Value {
        let body = self.last_body(path).expect("no request captured for path");
        serde_json::from_str(&body).expect("captured body is JSON")
    }
}

impl Drop for MockOllama {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Counts the handler as aborted if it is dropped while still pending
struct AbortGuard(Arc<MockState>);

impl Drop for AbortGuard {
    fn drop(&mut self) {
        self.0.aborted.fetch_add(1, Ordering::Relaxed);
    }
}

impl MockState {
    fn capture(&self, path: &'static str, body: String) {
        self.requests.lock().expect("lock").push(CapturedRequest { path, body });
    }
}

async fn hang(state: Arc<MockState>) -> Response {
    let _guard = AbortGuard(state);
    std::future::pending::<()>().await;
    StatusCode::OK.into_response()
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response()
}

fn json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn handle_chat(State(state): State<Arc<MockState>>, body: String) -> Response {
    state.chat_count.fetch_add(1, Ordering::Relaxed);
    state.capture("/api/chat", body);

    match state.mode {
        Mode::Failing => failure(),
        Mode::Hanging | Mode::Unresponsive => hang(state).await,
        Mode::Normal | Mode::Malformed => {
            let reply = serde_json::json!({
                "model": "llama2",
                "created_at": "2024-01-01T00:00:00Z",
                "message": { "role": "assistant", "content": state.reply },
                "done": true,
                "total_duration": 1_200_000,
                "eval_count": 12,
            });
            json_response(reply.to_string())
        }
    }
}

async fn handle_generate(State(state): State<Arc<MockState>>, body: String) -> Response {
    state.generate_count.fetch_add(1, Ordering::Relaxed);
    state.capture("/api/generate", body);

    match state.mode {
        Mode::Failing => failure(),
        Mode::Hanging | Mode::Unresponsive => hang(state).await,
        Mode::Normal | Mode::Malformed => json_response(GENERATE_BODY.to_owned()),
    }
}

async fn handle_tags(State(state): State<Arc<MockState>>) -> Response {
    state.tags_count.fetch_add(1, Ordering::Relaxed);

    match state.mode {
        Mode::Failing => failure(),
        Mode::Unresponsive => hang(state).await,
        Mode::Malformed => json_response("{\"models\": [".to_owned()),
        Mode::Normal | Mode::Hanging => json_response(
            serde_json::json!({
                "models": [
                    { "name": "llama2:latest", "size": 3_826_793_677_u64 },
                    { "name": "mistral:latest", "size": 4_109_865_159_u64 },
                ]
            })
            .to_string(),
        ),
    }
}
