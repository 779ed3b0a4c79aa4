//! Tanuki MCP server over stdio.

use std::sync::Arc;

use rmcp::ServiceExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use tanuki_client::{Config, GitLabClient};
use tanuki_server::{Result, ServerError, TanukiServer};
use tanuki_tools::ToolRegistry;

/// Initializes structured logging on stderr; stdout carries the protocol.
///
/// `TANUKI_LOG_FORMAT` selects `json` or `pretty` (default), `RUST_LOG`
/// sets the level.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let format = std::env::var("TANUKI_LOG_FORMAT")
        .unwrap_or_else(|_| "pretty".to_string())
        .to_lowercase();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tanuki_server=info,tanuki_tools=info,tanuki_client=info")
    });

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting tanuki MCP server");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };

    info!("Using GitLab at {}", config.gitlab_url());

    let client = Arc::new(GitLabClient::new(Arc::clone(&config)));
    let registry = Arc::new(ToolRegistry::gitlab(&client));

    info!("Registered {} tools", registry.len());

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let signals_handle = signals.handle();
    tokio::spawn(async move {
        use futures::stream::StreamExt;
        while let Some(signal) = signals.next().await {
            match signal {
                SIGTERM => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                    let _ = shutdown_tx.send(());
                    break;
                }
                SIGINT => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    let _ = shutdown_tx.send(());
                    break;
                }
                _ => {}
            }
        }
    });

    let service = TanukiServer::new(registry)
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    info!("Server ready");

    tokio::select! {
        quit = service.waiting() => match quit {
            Ok(reason) => info!("MCP session ended: {reason:?}"),
            Err(e) => warn!("MCP session task failed: {e}"),
        },
        _ = shutdown_rx.recv() => {
            info!("Closing MCP session");
        }
    }

    signals_handle.close();
    client.close().await;

    info!("Shutdown complete");

    Ok(())
}
