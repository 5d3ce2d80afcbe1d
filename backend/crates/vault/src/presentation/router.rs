//! Vault Router

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use platform::password::PasswordHasher;
use platform::rate_limit::RateLimiter;

use crate::application::config::VaultConfig;
use crate::application::gate::AuthGate;
use crate::domain::repository::{UserDataRepository, UserRepository};
use crate::domain::services::CredentialVerifier;
use crate::infra::sqlite::SqliteVaultRepository;
use crate::presentation::handlers::{self, VaultAppState};

/// Create the vault router with the SQLite repository
pub fn vault_router(
    repo: SqliteVaultRepository,
    limiter: Arc<RateLimiter>,
    hasher: Arc<PasswordHasher>,
    config: VaultConfig,
) -> Router {
    vault_router_generic(repo, limiter, hasher, config)
}

/// Create a vault router for any repository implementation.
///
/// The limiter is shared by every route; its lifecycle belongs to the caller.
pub fn vault_router_generic<R>(
    repo: R,
    limiter: Arc<RateLimiter>,
    hasher: Arc<PasswordHasher>,
    config: VaultConfig,
) -> Router
where
    R: UserRepository + UserDataRepository + Clone + Send + Sync + 'static,
{
    let max_body_bytes = config.max_body_bytes;
    let repo = Arc::new(repo);
    let gate = AuthGate::new(
        limiter,
        CredentialVerifier::new(hasher),
        repo.clone(),
        Arc::new(config),
    );
    let state = VaultAppState {
        repo,
        gate: Arc::new(gate),
    };

    Router::new()
        .route(
            "/register",
            post(handlers::register::<R>).fallback(handlers::bad_method),
        )
        .route(
            "/key",
            post(handlers::issue_key::<R>).fallback(handlers::bad_method),
        )
        .route(
            "/data",
            post(handlers::store_data::<R>)
                .get(handlers::load_data::<R>)
                .fallback(handlers::bad_method),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
