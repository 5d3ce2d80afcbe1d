//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are
//! `vault::VaultError` rendered through `kernel::error::AppError`.

mod settings;

use std::net::SocketAddr;
use std::sync::Arc;

use platform::password::PasswordHasher;
use platform::rate_limit::RateLimiter;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vault::{SqliteVaultRepository, vault_router};

use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,vault=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    // Database connection
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    tracing::info!("Connected to database");

    let repo = SqliteVaultRepository::new(pool.clone());
    repo.run_migrations().await?;

    // Hasher parameters are validated once, before accepting traffic
    let hasher = Arc::new(PasswordHasher::new(settings.vault.kdf)?);
    let limiter = Arc::new(RateLimiter::start(settings.vault.rate_limit()));

    let app = vault_router(repo, limiter.clone(), hasher, settings.vault.clone())
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("Listening on {}", settings.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    limiter.shutdown().await;
    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
