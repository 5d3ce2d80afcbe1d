//! Cryptographic Utilities

use std::hint::black_box;

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// The OS randomness source failed.
#[derive(Debug, Error)]
#[error("Random source unavailable: {0}")]
pub struct CryptoError(#[from] rand::Error);

/// Fill a fixed-size array from the OS randomness source
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// Encode bytes as base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Constant-time comparison to prevent timing attacks
///
/// Length mismatch returns early; lengths are not secret for any value
/// compared here (fixed-size hashes and keys).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= black_box(x ^ y);
    }
    black_box(result) == 0
}
