//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the error vocabulary shared by every crate:
//! - [`ErrorKind`] classification mapped to HTTP status codes
//! - [`AppError`], the client-facing error rendered by every HTTP handler
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}

pub use error::app_error::AppError;
pub use error::kind::ErrorKind;
