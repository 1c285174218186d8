use std::sync::Arc;

use movie_search::{
    api::{create_router, AppState},
    config::Config,
    services::TmdbCatalog,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_search=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // The bearer token is handed to the catalog once, here
    let catalog = Arc::new(TmdbCatalog::from_config(&config)?);
    let state = AppState::new(catalog).with_settle_timeout(config.settle_timeout());
    let reaper = state.spawn_session_reaper(config.reap_interval(), config.session_idle());

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
