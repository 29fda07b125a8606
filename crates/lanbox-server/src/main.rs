mod config;
mod net;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use lanbox_api::AppStateInner;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lanbox=debug,lanbox_api=debug,lanbox_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Opened once, shared by every request until shutdown
    let store = lanbox_db::open(&config.store_uri)?;
    let state = AppStateInner::new(store);

    let app = lanbox_api::router(state, config.max_upload_bytes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = net::bind(&config.host, config.port).await?;
    info!("Listening on {}", listener.local_addr()?);

    info!("Server running at:");
    info!("Local:           http://localhost:{}", config.port);
    match net::local_ipv4() {
        Some(ip) => info!("On Wifi Network: http://{}:{}", ip, config.port),
        None => warn!("On Wifi Network: no LAN address found"),
    }
    if let Some(max) = config.max_upload_bytes {
        info!("Upload limit: {} bytes", max);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
