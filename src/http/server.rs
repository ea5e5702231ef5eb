//! HTTP server startup logic.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::Notify;

use crate::config::{HttpServerConfig, SHUTDOWN_GRACE_PERIOD_SECS};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address {0}")]
    Address(String),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve `app` until a shutdown signal arrives and open requests drain.
///
/// Connections still open when the grace period runs out are dropped.
pub async fn start_server(app: Router, config: &HttpServerConfig) -> Result<(), ServerError> {
    let raw = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = raw.parse().map_err(|_| ServerError::Address(raw))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting HTTP server");

    let signalled = Arc::new(Notify::new());
    let notify = signalled.clone();

    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown::shutdown_signal().await;
        notify.notify_one();
    })
    .into_future();

    let grace_period = async {
        signalled.notified().await;
        tracing::info!(
            "Graceful shutdown initiated, waiting up to {} seconds for connections to close",
            SHUTDOWN_GRACE_PERIOD_SECS
        );
        tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;
    };

    tokio::select! {
        result = serve => result?,
        _ = grace_period => {
            tracing::warn!("Grace period elapsed, dropping open connections");
        }
    }

    tracing::info!("HTTP server stopped");
    Ok(())
}
