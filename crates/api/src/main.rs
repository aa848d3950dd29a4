//! OmniLink API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use omnilink_common::config::AppConfig;
use omnilink_common::db::{create_pool, run_migrations};
use omnilink_common::redis_pool::create_redis_pool;
use omnilink_engine::uploads::UploadStore;
use omnilink_notifier::TelegramClient;

use omnilink_api::routes::create_router;
use omnilink_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "omnilink_api=debug,omnilink_engine=debug,omnilink_notifier=debug,tower_http=debug",
            )
        }))
        .init();

    tracing::info!("Starting OmniLink API server...");

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database pool created");

    let redis = create_redis_pool(&config.redis_url).await?;

    let uploads = UploadStore::open(&config.uploads_dir).await?;
    let telegram = Arc::new(TelegramClient::new(config.telegram_api_base.clone()));

    let port = config.port;
    let state = AppState::new(pool, redis, config, telegram, uploads);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
