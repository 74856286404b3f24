mod config;

use std::net::SocketAddr;

use tower_http::services::ServeDir;
use tracing::info;

use guestbook_api::AppState;
use guestbook_store::DocumentStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "guestbook=debug,guestbook_api=debug,guestbook_store=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let store = DocumentStore::open(&config.data_file, config.variant).await?;
    let mut app = guestbook_api::router(AppState::new(store), &config.route);

    // The page and its static data files (wishlist etc.) can be hosted by the same process.
    if let Some(dir) = &config.static_dir {
        info!("Serving static site from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    let addr: SocketAddr = config.addr()?;
    info!("Guestbook ({}) listening on {}{}", config.variant, addr, config.route);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
