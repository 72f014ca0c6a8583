use proxy_server::app;
use proxy_server::config::ServerArgs;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use forwarder::Forwarder;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    let _guards = logging::init(args.log_mode(), args.verbose)?;

    let config = match args.upstream_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to configure n8n API client: {}", e);
            return Err(e.into());
        }
    };
    info!("Forwarding MCP requests to {}", config.base_url());

    let forwarder = Forwarder::new(&config).context("Failed to build n8n API client")?;
    let app = app(forwarder);

    if let Some(socket) = args.socket {
        serve_unix_socket(socket, app).await?;
    } else {
        serve_tcp_socket(args.bind_address(), app).await?;
    }

    info!("HTTP server shut down gracefully");
    Ok(())
}

#[cfg(unix)]
async fn serve_unix_socket(socket: PathBuf, app: Router) -> Result<()> {
    let listener = tokio::net::UnixListener::bind(&socket)
        .with_context(|| format!("Failed to bind unix socket {}", socket.display()))?;
    info!("HTTP server listening on {}", socket.display());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    remove_socket(&socket).await;

    served.context("HTTP server failed")
}

#[cfg(not(unix))]
async fn serve_unix_socket(_socket: PathBuf, _app: Router) -> Result<()> {
    anyhow::bail!("Unix sockets are not supported on this platform")
}

async fn serve_tcp_socket(bind: String, app: Router) -> Result<()> {
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("HTTP server listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(unix)]
async fn remove_socket(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        error!("Failed to remove socket {}: {}", path.display(), e);
    }
}
