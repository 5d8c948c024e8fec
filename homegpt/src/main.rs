#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use homegpt_config::Config;
use homegpt_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, from_file) = load_config(&args)?;

    homegpt_telemetry::init(&config.telemetry)?;

    if !from_file {
        tracing::info!(path = %args.config.display(), "config file not found, using defaults");
    }

    tracing::info!(
        config_path = %args.config.display(),
        "starting homegpt"
    );

    let server = Server::new(&config)?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("homegpt stopped");
    Ok(())
}

/// Load the configuration named by `args` and apply command-line overrides
///
/// The flag is false when the file was absent and defaults were used.
fn load_config(args: &Args) -> anyhow::Result<(Config, bool)> {
    let from_file = args.config.exists();
    let mut config = Config::load_or_default(&args.config)?;

    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    Ok((config, from_file))
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
