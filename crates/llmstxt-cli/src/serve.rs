//! Reader proxy server

use llmstxt::{router, ProxyState, ServerConfig};
use std::io;
use tokio::net::TcpListener;
use tracing::info;

/// Bind and serve until Ctrl-C
pub async fn run(config: ServerConfig) -> io::Result<()> {
    let state = ProxyState::from_config(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let app = router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        addr = %listener.local_addr()?,
        upstream = %config.crawler_api_url,
        "Reader proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, serve until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
