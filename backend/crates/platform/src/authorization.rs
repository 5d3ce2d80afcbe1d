//! Authorization Header Parsing
//!
//! Basic-Auth (`username:password`) and Bearer token extraction.

use axum::http::{HeaderMap, header};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::from_base64;

const BASIC_PREFIX: &str = "Basic ";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Malformed Authorization header: expected basic auth")]
    MalformedBasic,

    #[error("Malformed Authorization header: expected bearer token")]
    MalformedBearer,
}

/// Username and password pair from a Basic-Auth header.
///
/// The password is wiped from memory on drop.
pub struct BasicCredentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn authorization_value(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()
}

/// Strip a case-insensitive scheme prefix (`Basic `, `Bearer `).
fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let head = value.get(..scheme.len())?;
    if head.eq_ignore_ascii_case(scheme) {
        Some(&value[scheme.len()..])
    } else {
        None
    }
}

/// Parse `Authorization: Basic base64(username:password)`
pub fn parse_basic(headers: &HeaderMap) -> Result<BasicCredentials, AuthorizationError> {
    let value = authorization_value(headers).ok_or(AuthorizationError::MalformedBasic)?;
    let encoded = strip_scheme(value, BASIC_PREFIX).ok_or(AuthorizationError::MalformedBasic)?;

    let decoded = Zeroizing::new(
        from_base64(encoded.trim()).map_err(|_| AuthorizationError::MalformedBasic)?,
    );
    let text = std::str::from_utf8(&decoded).map_err(|_| AuthorizationError::MalformedBasic)?;
    let (username, password) = text
        .split_once(':')
        .ok_or(AuthorizationError::MalformedBasic)?;

    Ok(BasicCredentials {
        username: username.to_string(),
        password: Zeroizing::new(password.to_string()),
    })
}

/// Parse `Authorization: Bearer <token>` and return the token
pub fn parse_bearer(headers: &HeaderMap) -> Result<&str, AuthorizationError> {
    let value = authorization_value(headers).ok_or(AuthorizationError::MalformedBearer)?;
    let token = strip_scheme(value, BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthorizationError::MalformedBearer)?;

    if token.is_empty() {
        return Err(AuthorizationError::MalformedBearer);
    }
    Ok(token)
}
