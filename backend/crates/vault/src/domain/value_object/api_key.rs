//! API Key Value Object
//!
//! A random 16-byte bearer token, persisted as standard base64.

use std::fmt;

use platform::crypto::{CryptoError, constant_time_eq, from_base64, random_array, to_base64};

/// API key length in bytes
pub const API_KEY_LEN: usize = 16;

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey([u8; API_KEY_LEN]);

impl ApiKey {
    /// Generate a new random key
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self(random_array()?))
    }

    pub fn from_bytes(bytes: [u8; API_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode from base64. Returns `None` for bad encoding or wrong length.
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = from_base64(encoded).ok()?;
        let bytes: [u8; API_KEY_LEN] = bytes.as_slice().try_into().ok()?;
        Some(Self(bytes))
    }

    /// Standard base64 encoding (the stored and transmitted form)
    pub fn encode(&self) -> String {
        to_base64(&self.0)
    }

    /// Fixed-time equality
    pub fn ct_eq(&self, other: &ApiKey) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}
