//! HTTP server assembling the gateway and upload routes

mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use homegpt_config::Config;
use homegpt_llm::OllamaClient;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// The inference client is resolved once here and shared by every
    /// request through router state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let client = Arc::new(OllamaClient::from_overrides(&config.ollama));
        let upload_store = audio_store::build_store(config);

        let effective = client.config();
        tracing::info!(
            base_url = %effective.base_url,
            model = %effective.model,
            timeout_ms = u64::try_from(effective.timeout.as_millis()).unwrap_or(u64::MAX),
            "inference backend configured"
        );

        let mut app = Router::new()
            .merge(homegpt_llm::llm_router(client))
            .merge(audio_store::endpoint_router(&upload_store).with_state(upload_store));

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address: config.server.listen_address(),
        })
    }

    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
