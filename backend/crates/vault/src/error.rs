//! Vault Error Types
//!
//! Vault-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::authorization::AuthorizationError;
use platform::crypto::CryptoError;
use platform::password::PasswordHashError;
use thiserror::Error;
use tracing::Level;

/// Vault-specific result type alias
pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Route exists but not for this method
    #[error("Bad Request")]
    MethodNotAllowed,

    #[error("Malformed Authorization header: expected basic auth")]
    MalformedBasicAuth,

    #[error("Malformed Authorization header: expected bearer token")]
    MalformedBearer,

    /// Password or key is not valid base64
    #[error("Bad Request")]
    BadEncoding,

    #[error("User Already exists")]
    UserAlreadyExists,

    #[error("Too Many Requests")]
    RateLimited,

    /// Unknown user, unknown key, or wrong secret. One variant on purpose.
    #[error("Unauthorized")]
    InvalidCredentials,

    #[error("Payload Too Large")]
    PayloadTooLarge,

    /// No client address for the rate-limit key
    #[error("Client identity could not be resolved")]
    IdentityUnresolved,

    #[error(transparent)]
    Randomness(#[from] CryptoError),

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::MethodNotAllowed
            | VaultError::MalformedBasicAuth
            | VaultError::MalformedBearer
            | VaultError::BadEncoding
            | VaultError::UserAlreadyExists => ErrorKind::BadRequest,
            VaultError::RateLimited => ErrorKind::TooManyRequests,
            VaultError::InvalidCredentials => ErrorKind::Unauthorized,
            VaultError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            VaultError::IdentityUnresolved
            | VaultError::Randomness(_)
            | VaultError::PasswordHash(_)
            | VaultError::Database(_)
            | VaultError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert to AppError. Server-side details stay out of the message.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::new(kind, kind.as_str())
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    /// Level this error is logged at: error for 5xx, warn for throttling
    /// and credential failures, debug for other client errors.
    pub fn log_level(&self) -> Level {
        match self {
            VaultError::IdentityUnresolved
            | VaultError::Randomness(_)
            | VaultError::PasswordHash(_)
            | VaultError::Database(_)
            | VaultError::Internal(_) => Level::ERROR,
            VaultError::RateLimited | VaultError::InvalidCredentials => Level::WARN,
            VaultError::MethodNotAllowed
            | VaultError::MalformedBasicAuth
            | VaultError::MalformedBearer
            | VaultError::BadEncoding
            | VaultError::UserAlreadyExists
            | VaultError::PayloadTooLarge => Level::DEBUG,
        }
    }

    fn log(&self) {
        match self {
            VaultError::Database(e) => {
                tracing::error!(error = %e, "Vault database error");
            }
            _ if self.log_level() == Level::ERROR => {
                tracing::error!(error = %self, "Vault internal error");
            }
            VaultError::RateLimited => {
                tracing::warn!("Rate limit exceeded");
            }
            VaultError::InvalidCredentials => {
                tracing::warn!("Credential verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Vault request rejected");
            }
        }
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AuthorizationError> for VaultError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::MalformedBasic => VaultError::MalformedBasicAuth,
            AuthorizationError::MalformedBearer => VaultError::MalformedBearer,
        }
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(err: tokio::task::JoinError) -> Self {
        VaultError::Internal(format!("blocking task failed: {err}"))
    }
}
