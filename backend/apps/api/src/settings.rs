//! Process Settings
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use vault::VaultConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://vault.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:54321";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub vault: VaultConfig,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source. Unset variables take defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = VaultConfig::default();

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is not a socket address: {bind_addr}"))?;

        let vault = VaultConfig {
            default_window: millis(&get, "VAULT_DEFAULT_WINDOW_MS", defaults.default_window)?,
            register_window: millis(&get, "VAULT_REGISTER_WINDOW_MS", defaults.register_window)?,
            key_window: millis(&get, "VAULT_KEY_WINDOW_MS", defaults.key_window)?,
            data_write_window: millis(
                &get,
                "VAULT_DATA_WRITE_WINDOW_MS",
                defaults.data_write_window,
            )?,
            sweep_interval: millis(&get, "VAULT_SWEEP_INTERVAL_MS", defaults.sweep_interval)?,
            trust_forwarded_for: parsed(
                &get,
                "VAULT_TRUST_FORWARDED_FOR",
                defaults.trust_forwarded_for,
            )?,
            max_body_bytes: parsed(&get, "VAULT_MAX_BODY_BYTES", defaults.max_body_bytes)?,
            max_concurrent_hashes: parsed(
                &get,
                "VAULT_MAX_CONCURRENT_HASHES",
                defaults.max_concurrent_hashes,
            )?,
            kdf: defaults.kdf,
        };

        if vault.sweep_interval.is_zero() {
            anyhow::bail!("VAULT_SWEEP_INTERVAL_MS must be greater than zero");
        }
        if vault.max_concurrent_hashes == 0 {
            anyhow::bail!("VAULT_MAX_CONCURRENT_HASHES must be greater than zero");
        }

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            vault,
        })
    }
}

fn parsed<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn millis(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> anyhow::Result<Duration> {
    match get(name) {
        Some(_) => parsed::<u64>(get, name, 0).map(Duration::from_millis),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(s.bind_addr.port(), 54321);
        assert_eq!(s.vault.default_window, Duration::from_secs(1));
        assert_eq!(s.vault.register_window, Duration::from_secs(10));
        assert_eq!(s.vault.sweep_interval, Duration::from_secs(10));
        assert!(!s.vault.trust_forwarded_for);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("VAULT_KEY_WINDOW_MS", "2500"),
            ("VAULT_TRUST_FORWARDED_FOR", "true"),
            ("VAULT_MAX_BODY_BYTES", "4096"),
            ("VAULT_MAX_CONCURRENT_HASHES", "4"),
        ])
        .unwrap();

        assert_eq!(s.database_url, "sqlite::memory:");
        assert_eq!(s.bind_addr.port(), 8080);
        assert_eq!(s.vault.key_window, Duration::from_millis(2500));
        assert!(s.vault.trust_forwarded_for);
        assert_eq!(s.vault.max_body_bytes, 4096);
        assert_eq!(s.vault.max_concurrent_hashes, 4);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(settings(&[("VAULT_DEFAULT_WINDOW_MS", "soon")]).is_err());
        assert!(settings(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(settings(&[("VAULT_TRUST_FORWARDED_FOR", "yes")]).is_err());
        assert!(settings(&[("VAULT_SWEEP_INTERVAL_MS", "0")]).is_err());
        assert!(settings(&[("VAULT_MAX_CONCURRENT_HASHES", "0")]).is_err());
    }
}
