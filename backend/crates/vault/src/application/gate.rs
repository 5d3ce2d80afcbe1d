//! Auth Gate
//!
//! Per-request pipeline in front of storage:
//! Identify -> RateLimit -> ExtractCredentials -> Lookup -> Verify.
//! Each step exits early with a classified [`VaultError`].

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use platform::authorization::{parse_basic, parse_bearer};
use platform::client::resolve_identity;
use platform::crypto::from_base64;
use platform::password::Credential;
use platform::rate_limit::RateLimiter;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use zeroize::Zeroizing;

use crate::application::config::VaultConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::services::CredentialVerifier;
use crate::domain::value_object::api_key::ApiKey;
use crate::error::{VaultError, VaultResult};

/// Endpoint kinds, each with its own quota policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Register,
    IssueKey,
    StoreData,
    LoadData,
}

/// Quota applied to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitPolicy {
    /// The limiter's default window
    Default,
    /// An explicit window
    Window(Duration),
}

impl RateLimitPolicy {
    pub fn for_endpoint(endpoint: Endpoint, config: &VaultConfig) -> Self {
        match endpoint {
            Endpoint::Register => Self::Window(config.register_window),
            Endpoint::IssueKey => Self::Window(config.key_window),
            Endpoint::StoreData => Self::Window(config.data_write_window),
            Endpoint::LoadData => Self::Default,
        }
    }
}

/// Username and decoded password from a Basic-Auth header
pub struct PasswordCredentials {
    pub username: String,
    pub password: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Result of looking up and verifying a password user
#[derive(Debug)]
pub enum PasswordCheck {
    Verified(User),
    UnknownUser,
    Mismatch,
}

pub struct AuthGate<R>
where
    R: UserRepository,
{
    limiter: Arc<RateLimiter>,
    verifier: CredentialVerifier,
    user_repo: Arc<R>,
    config: Arc<VaultConfig>,
    /// Caps concurrent KDF runs; each one holds `kdf.memory_kib` of memory.
    hash_permits: Arc<Semaphore>,
}

impl<R> AuthGate<R>
where
    R: UserRepository,
{
    pub fn new(
        limiter: Arc<RateLimiter>,
        verifier: CredentialVerifier,
        user_repo: Arc<R>,
        config: Arc<VaultConfig>,
    ) -> Self {
        let hash_permits = Arc::new(Semaphore::new(config.max_concurrent_hashes.max(1)));
        Self {
            limiter,
            verifier,
            user_repo,
            config,
            hash_permits,
        }
    }

    // ========================================================================
    // Identify + RateLimit
    // ========================================================================

    /// Resolve the rate-limit identity. No address is an internal error.
    pub fn identify(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> VaultResult<String> {
        resolve_identity(
            headers,
            peer.map(|addr| addr.ip()),
            self.config.trust_forwarded_for,
        )
        .ok_or(VaultError::IdentityUnresolved)
    }

    pub fn rate_limit(&self, identity: &str, endpoint: Endpoint) -> VaultResult<()> {
        let allowed = match RateLimitPolicy::for_endpoint(endpoint, &self.config) {
            RateLimitPolicy::Default => self.limiter.allow(identity),
            RateLimitPolicy::Window(window) => self.limiter.allow_with_window(identity, window),
        };

        if allowed {
            Ok(())
        } else {
            Err(VaultError::RateLimited)
        }
    }

    /// Identify the caller and charge the endpoint's quota.
    ///
    /// Runs before any credential parsing so throttled callers cost no hashing.
    pub fn admit(
        &self,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        endpoint: Endpoint,
    ) -> VaultResult<String> {
        let identity = self.identify(headers, peer)?;
        self.rate_limit(&identity, endpoint)?;
        Ok(identity)
    }

    // ========================================================================
    // ExtractCredentials
    // ========================================================================

    /// Basic-Auth with a base64-encoded password
    pub fn password_credentials(&self, headers: &HeaderMap) -> VaultResult<PasswordCredentials> {
        let basic = parse_basic(headers)?;
        let password = from_base64(&basic.password).map_err(|_| VaultError::BadEncoding)?;

        Ok(PasswordCredentials {
            username: basic.username,
            password: Zeroizing::new(password),
        })
    }

    /// Bearer API key
    pub fn bearer_key(&self, headers: &HeaderMap) -> VaultResult<ApiKey> {
        let token = parse_bearer(headers)?;
        ApiKey::decode(token).ok_or(VaultError::BadEncoding)
    }

    // ========================================================================
    // Lookup + Verify
    // ========================================================================

    /// Look up the named user and verify the password.
    ///
    /// Not-found is reported, not raised; the caller decides what it means.
    pub async fn check_password(&self, credentials: &PasswordCredentials) -> VaultResult<PasswordCheck> {
        let Some(user) = self
            .user_repo
            .find_user_by_name(&credentials.username)
            .await?
        else {
            return Ok(PasswordCheck::UnknownUser);
        };

        let permit = self.hash_permit().await?;
        let verifier = self.verifier.clone();
        let password = credentials.password.clone();
        let credential = user.credential.clone();
        let matches = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            verifier.verify_password(&password, &credential)
        })
        .await??;

        if matches {
            Ok(PasswordCheck::Verified(user))
        } else {
            Ok(PasswordCheck::Mismatch)
        }
    }

    /// Resolve the user owning `key`. Unknown and mismatched keys look the same.
    pub async fn authenticate_key(&self, key: &ApiKey) -> VaultResult<User> {
        let user = self
            .user_repo
            .find_user_by_key(&key.encode())
            .await?
            .ok_or(VaultError::InvalidCredentials)?;

        if !self.verifier.verify_api_key(key, user.api_key.as_deref()) {
            return Err(VaultError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Hash a new password off the async executor
    pub async fn new_credential(&self, password: &Zeroizing<Vec<u8>>) -> VaultResult<Credential> {
        let permit = self.hash_permit().await?;
        let hasher = self.verifier.hasher().clone();
        let password = password.clone();
        let credential = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            hasher.new_credential(&password)
        })
        .await??;
        Ok(credential)
    }

    // The permit moves into the blocking task, so it is released only when
    // the derivation finishes, even if the request is dropped first.
    async fn hash_permit(&self) -> VaultResult<OwnedSemaphorePermit> {
        self.hash_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| VaultError::Internal("KDF permit pool closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{KdfParams, PasswordHasher};

    use crate::infra::memory::InMemoryVaultRepository;

    fn light_config() -> VaultConfig {
        VaultConfig {
            kdf: KdfParams {
                time_cost: 1,
                memory_kib: 64,
                parallelism: 1,
                output_len: 32,
            },
            ..VaultConfig::default()
        }
    }

    fn gate(config: VaultConfig) -> AuthGate<InMemoryVaultRepository> {
        let limiter = Arc::new(RateLimiter::start(config.rate_limit()));
        let hasher = Arc::new(PasswordHasher::new(config.kdf).unwrap());
        AuthGate::new(
            limiter,
            CredentialVerifier::new(hasher),
            Arc::new(InMemoryVaultRepository::new()),
            Arc::new(config),
        )
    }

    #[test]
    fn test_policy_for_each_endpoint() {
        let config = VaultConfig {
            default_window: Duration::from_millis(100),
            register_window: Duration::from_millis(200),
            key_window: Duration::from_millis(300),
            data_write_window: Duration::from_millis(400),
            ..VaultConfig::default()
        };

        assert_eq!(
            RateLimitPolicy::for_endpoint(Endpoint::Register, &config),
            RateLimitPolicy::Window(Duration::from_millis(200))
        );
        assert_eq!(
            RateLimitPolicy::for_endpoint(Endpoint::IssueKey, &config),
            RateLimitPolicy::Window(Duration::from_millis(300))
        );
        assert_eq!(
            RateLimitPolicy::for_endpoint(Endpoint::StoreData, &config),
            RateLimitPolicy::Window(Duration::from_millis(400))
        );
        assert_eq!(
            RateLimitPolicy::for_endpoint(Endpoint::LoadData, &config),
            RateLimitPolicy::Default
        );
    }

    #[tokio::test]
    async fn test_hashing_waits_for_a_permit() {
        let gate = gate(VaultConfig {
            max_concurrent_hashes: 1,
            ..light_config()
        });
        let password = Zeroizing::new(b"hunter2".to_vec());

        let held = gate.hash_permits.clone().acquire_owned().await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), gate.new_credential(&password)).await;
        assert!(blocked.is_err(), "derivation ran without a permit");

        drop(held);
        assert!(gate.new_credential(&password).await.is_ok());
        assert_eq!(gate.hash_permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_zero_hash_limit_still_admits_one() {
        let gate = gate(VaultConfig {
            max_concurrent_hashes: 0,
            ..light_config()
        });
        let password = Zeroizing::new(b"hunter2".to_vec());

        assert!(gate.new_credential(&password).await.is_ok());
    }
}
