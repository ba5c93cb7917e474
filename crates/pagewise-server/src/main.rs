//! pagewise-server: WebSocket back end for the Pagewise side panel.
//!
//! Accepts WebSocket connections from the browser extension, answers
//! page-analysis and chat requests through the session manager, and
//! periodically removes idle sessions.

mod assistant;
mod connection;
mod protocol;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pagewise_ai::{client_factory, AssistantSettings, SessionManager};
use pagewise_config::{config_to_json, default_config_path, load_config_from, PagewiseConfig};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

use crate::assistant::Assistant;
use crate::connection::handle_connection;

#[derive(Parser)]
#[command(name = "pagewise-server", about = "Page-aware chat assistant back end")]
struct Args {
    /// Port to listen on (overrides `server.port`).
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or full filter directive, e.g. `debug` or `pagewise_ai=trace`.
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directive.into()),
        )
        .init();
}

fn log_directive(args: &Args, config: Option<&PagewiseConfig>) -> String {
    match (&args.log_level, config) {
        (Some(level), _) if level.contains('=') => level.clone(),
        (Some(level), _) => format!("pagewise={level}"),
        (None, Some(config)) => format!("pagewise={}", config.logging.level.as_directive()),
        (None, None) => "pagewise=info".into(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = match args.config.clone() {
        Some(path) => Ok(path),
        None => default_config_path(),
    };
    let loaded = config_path
        .and_then(|path| load_config_from(&path).map(|config| (path, config)));

    let (config_path, config) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            init_logging(&log_directive(&args, None));
            tracing::error!(error = %e, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&log_directive(&args, Some(&config)));
    tracing::debug!(config = %config_to_json(&config), "Effective configuration");

    let manager = SessionManager::new(AssistantSettings::from(&config), client_factory());
    if !config.model.has_api_key() {
        tracing::warn!("No API key configured; waiting for setApiKey");
    }
    tracing::info!(
        config = %config_path.display(),
        model = %config.model.model,
        mode = ?config.pipeline.mode,
        "Settings loaded"
    );

    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.bind_address, port);

    // Spawn idle session reaper.
    let reaper = manager.clone();
    let interval = Duration::from_secs(config.session.sweep_interval_secs);
    let max_idle = Duration::from_secs(config.session.max_idle_secs);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = reaper.sweep_idle(max_idle).await;
            let count = reaper.session_count().await;
            tracing::debug!(removed, sessions = count, "Reaper tick");
        }
    });

    let assistant = Arc::new(Assistant::new(manager, config, config_path));
    match serve(&addr, assistant).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

/// Bind `addr` and accept connections. Returns only if binding fails.
async fn serve(addr: &str, assistant: Arc<Assistant>) -> pagewise_common::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "pagewise-server listening");

    // Accept loop.
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let assistant = assistant.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, peer, assistant).await,
                        Err(e) => {
                            tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}
