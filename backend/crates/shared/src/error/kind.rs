//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// Error classification shared across the service.
///
/// Credential mismatches and unknown identities both map to
/// [`ErrorKind::Unauthorized`]; callers must not be able to tell them apart.
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::TooManyRequests;
/// assert_eq!(kind.status_code(), 429);
/// assert_eq!(kind.as_str(), "Too Many Requests");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - malformed method, header, or encoding
    BadRequest,
    /// 401 - credential mismatch or unknown identity
    Unauthorized,
    /// 404 - no such route
    NotFound,
    /// 413 - request body over the configured limit
    PayloadTooLarge,
    /// 429 - quota exceeded, client must back off
    TooManyRequests,
    /// 500 - identity resolution, storage or randomness failure
    InternalServerError,
}

impl ErrorKind {
    /// HTTP status code for this kind
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
        }
    }

    /// Standard reason phrase
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::PayloadTooLarge => "Payload Too Large",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
        }
    }

    /// 5xx kinds. These are always logged at error level.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::PayloadTooLarge.status_code(), 413);
        assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
    }

    #[test]
    fn test_server_error_split() {
        assert!(ErrorKind::InternalServerError.is_server_error());
        assert!(!ErrorKind::TooManyRequests.is_server_error());
    }

    #[test]
    fn test_serialized_name() {
        let json = serde_json::to_string(&ErrorKind::TooManyRequests).unwrap();
        assert_eq!(json, r#""TOO_MANY_REQUESTS""#);
    }
}
