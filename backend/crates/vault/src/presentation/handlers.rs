//! HTTP Handlers
//!
//! Every handler admits the caller through the gate (identity + quota)
//! before touching credentials or storage.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::data::{LoadDataUseCase, StoreDataUseCase};
use crate::application::gate::{AuthGate, Endpoint};
use crate::application::issue_key::IssueKeyUseCase;
use crate::application::register::RegisterUseCase;
use crate::domain::repository::{UserDataRepository, UserRepository};
use crate::error::{VaultError, VaultResult};
use crate::presentation::extract::PeerAddr;

/// Shared state for vault handlers
#[derive(Clone)]
pub struct VaultAppState<R>
where
    R: UserRepository + UserDataRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub gate: Arc<AuthGate<R>>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<VaultAppState<R>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
) -> VaultResult<StatusCode>
where
    R: UserRepository + UserDataRepository + Clone + Send + Sync + 'static,
{
    state.gate.admit(&headers, peer, Endpoint::Register)?;
    let credentials = state.gate.password_credentials(&headers)?;

    RegisterUseCase::new(state.repo.clone(), state.gate.clone())
        .execute(credentials)
        .await?;

    Ok(StatusCode::OK)
}

// ============================================================================
// Key
// ============================================================================

/// POST /key
///
/// Responds with the base64 key as plain text.
pub async fn issue_key<R>(
    State(state): State<VaultAppState<R>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
) -> VaultResult<String>
where
    R: UserRepository + UserDataRepository + Clone + Send + Sync + 'static,
{
    state.gate.admit(&headers, peer, Endpoint::IssueKey)?;
    let credentials = state.gate.password_credentials(&headers)?;

    let output = IssueKeyUseCase::new(state.repo.clone(), state.gate.clone())
        .execute(credentials)
        .await?;

    Ok(output.key.encode())
}

// ============================================================================
// Data
// ============================================================================

/// POST /data
pub async fn store_data<R>(
    State(state): State<VaultAppState<R>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> VaultResult<StatusCode>
where
    R: UserRepository + UserDataRepository + Clone + Send + Sync + 'static,
{
    state.gate.admit(&headers, peer, Endpoint::StoreData)?;
    let key = state.gate.bearer_key(&headers)?;
    let body = body.map_err(body_error)?;

    StoreDataUseCase::new(state.repo.clone(), state.gate.clone())
        .execute(&key, &body)
        .await?;

    Ok(StatusCode::OK)
}

/// GET /data
pub async fn load_data<R>(
    State(state): State<VaultAppState<R>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
) -> VaultResult<String>
where
    R: UserRepository + UserDataRepository + Clone + Send + Sync + 'static,
{
    state.gate.admit(&headers, peer, Endpoint::LoadData)?;
    let key = state.gate.bearer_key(&headers)?;

    LoadDataUseCase::new(state.repo.clone(), state.gate.clone())
        .execute(&key)
        .await
}

/// Any method a route does not serve
pub async fn bad_method() -> impl IntoResponse {
    VaultError::MethodNotAllowed
}

fn body_error(rejection: BytesRejection) -> VaultError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        VaultError::PayloadTooLarge
    } else {
        VaultError::Internal(format!("Failed to read body: {}", rejection.body_text()))
    }
}
