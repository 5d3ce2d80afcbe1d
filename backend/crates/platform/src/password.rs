//! Password Hashing
//!
//! Salted, memory-hard password derivation with Argon2id.
//!
//! ## Security Features
//! - Argon2id with fixed, process-wide parameters (t=3, m=1 GiB, p=8)
//! - Fresh 16-byte random salt per credential
//! - Deterministic: identical (password, salt) always yields identical hash
//!
//! Comparison of derived hashes is not done here; see
//! [`crate::crypto::constant_time_eq`].

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use crate::crypto::{CryptoError, random_array};

// ============================================================================
// Constants
// ============================================================================

/// Salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// Argon2id passes
pub const ARGON_TIME_COST: u32 = 3;

/// Argon2id memory in KiB (1 GiB)
pub const ARGON_MEMORY_KIB: u32 = 1 << 20;

/// Argon2id lanes
pub const ARGON_PARALLELISM: u32 = 8;

/// Derived hash length in bytes
pub const HASH_LEN: usize = 32;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Parameters rejected by Argon2 (only possible at construction)
    #[error("Invalid KDF parameters: {0}")]
    InvalidParams(String),

    /// Derivation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Salt could not be generated
    #[error(transparent)]
    Salt(#[from] CryptoError),
}

// ============================================================================
// Parameters
// ============================================================================

/// Argon2id cost parameters.
///
/// Fixed once per process. [`KdfParams::default`] is the production setting;
/// lighter values exist only so tests can run without a 1 GiB allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub time_cost: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
    pub output_len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            time_cost: ARGON_TIME_COST,
            memory_kib: ARGON_MEMORY_KIB,
            parallelism: ARGON_PARALLELISM,
            output_len: HASH_LEN,
        }
    }
}

// ============================================================================
// Credential
// ============================================================================

/// Salt and derived hash produced at registration.
///
/// Immutable once created; held by the user record.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub password_hash: Vec<u8>,
    pub salt: [u8; SALT_LEN],
}

impl Credential {
    /// Rebuild from stored columns. Returns `None` if the salt length is wrong.
    pub fn from_parts(password_hash: Vec<u8>, salt: &[u8]) -> Option<Self> {
        let salt: [u8; SALT_LEN] = salt.try_into().ok()?;
        Some(Self {
            password_hash,
            salt,
        })
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("password_hash", &"[HASH]")
            .field("salt", &"[SALT]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id password hasher with fixed parameters.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: KdfParams,
}

impl PasswordHasher {
    pub fn new(params: KdfParams) -> Result<Self, PasswordHashError> {
        let argon_params = Params::new(
            params.memory_kib,
            params.time_cost,
            params.parallelism,
            Some(params.output_len),
        )
        .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params),
            params,
        })
    }

    /// Derive the hash of `password` under `salt`.
    ///
    /// CPU- and memory-bound by design. Call from a blocking context.
    pub fn derive(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, PasswordHashError> {
        let mut output = vec![0u8; self.params.output_len];
        self.argon2
            .hash_password_into(password, salt, &mut output)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(output)
    }

    /// Create a credential with a fresh random salt.
    pub fn new_credential(&self, password: &[u8]) -> Result<Credential, PasswordHashError> {
        let salt: [u8; SALT_LEN] = random_array()?;
        let password_hash = self.derive(password, &salt)?;

        Ok(Credential {
            password_hash,
            salt,
        })
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
