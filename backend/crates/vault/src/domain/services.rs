//! Domain Services
//!
//! Credential verification. Every comparison here is fixed-time.

use std::sync::Arc;

use platform::crypto::constant_time_eq;
use platform::password::{Credential, PasswordHashError, PasswordHasher};

use crate::domain::value_object::api_key::ApiKey;

/// Compares supplied secrets against stored ones.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    hasher: Arc<PasswordHasher>,
}

impl CredentialVerifier {
    pub fn new(hasher: Arc<PasswordHasher>) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &Arc<PasswordHasher> {
        &self.hasher
    }

    /// Derive from `candidate` with the stored salt and compare to the stored hash.
    ///
    /// Runs the full KDF; call from a blocking context.
    pub fn verify_password(
        &self,
        candidate: &[u8],
        credential: &Credential,
    ) -> Result<bool, PasswordHashError> {
        let derived = self.hasher.derive(candidate, &credential.salt)?;
        Ok(constant_time_eq(&derived, &credential.password_hash))
    }

    /// Compare a presented key with the stored encoding.
    ///
    /// An absent or undecodable stored key never matches.
    pub fn verify_api_key(&self, candidate: &ApiKey, stored: Option<&str>) -> bool {
        match stored.and_then(ApiKey::decode) {
            Some(stored) => candidate.ct_eq(&stored),
            None => false,
        }
    }
}
