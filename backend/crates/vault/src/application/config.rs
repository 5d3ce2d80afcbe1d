//! Application Configuration
//!
//! Configuration for the vault application layer.

use std::time::Duration;

use platform::password::KdfParams;
use platform::rate_limit::RateLimitConfig;

/// Vault application configuration
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Window for the default policy (data reads)
    pub default_window: Duration,
    /// Window applied to `/register`
    pub register_window: Duration,
    /// Window applied to `/key`
    pub key_window: Duration,
    /// Window applied to `POST /data`
    pub data_write_window: Duration,
    /// Interval between rate limit eviction passes
    pub sweep_interval: Duration,
    /// Argon2id parameters, fixed for the process
    pub kdf: KdfParams,
    /// Use the first `X-Forwarded-For` address as identity
    pub trust_forwarded_for: bool,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Password derivations allowed to run at once
    pub max_concurrent_hashes: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            default_window: Duration::from_secs(1),
            register_window: Duration::from_secs(10),
            key_window: Duration::from_secs(10),
            data_write_window: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(10),
            kdf: KdfParams::default(),
            trust_forwarded_for: false,
            max_body_bytes: 1024 * 1024,
            max_concurrent_hashes: 2,
        }
    }
}

impl VaultConfig {
    /// Limiter settings derived from this config
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            default_window: self.default_window,
            sweep_interval: self.sweep_interval,
        }
    }
}
