//! Application Error - Unified error type for the application
//!
//! Defines the [`AppError`] struct rendered at the HTTP boundary.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Unified application error.
///
/// Domain crates keep their own `thiserror` enums and convert into this
/// type at the HTTP boundary. `message` is safe to show to clients.
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::BadRequest, "Malformed Authorization header");
/// assert_eq!(err.status_code(), 400);
/// ```
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {}
