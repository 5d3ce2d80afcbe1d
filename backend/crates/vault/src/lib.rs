//! Vault Backend Module
//!
//! A small authenticated store: register with a password, exchange it for
//! an API key, then read and overwrite one text slot with that key.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, credential verification, repository traits
//! - `application/` - Auth gate and use cases
//! - `infra/` - SQLite and in-memory repositories
//! - `presentation/` - HTTP handlers and router
//!
//! ## Security Model
//! - Every request is rate limited per client identity before credentials are parsed
//! - Passwords are stored as Argon2id hashes with a per-user random salt
//! - Secret comparisons are fixed-time
//! - Unknown users, unknown keys, and wrong secrets are indistinguishable (401)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use infra::{InMemoryVaultRepository, SqliteVaultRepository};
pub use presentation::router::{vault_router, vault_router_generic};
