//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (secure random, Base64, constant-time equality)
//! - Password hashing (Argon2id with fixed parameters)
//! - Authorization header parsing (Basic, Bearer)
//! - Client identity resolution
//! - Rate limiting infrastructure

pub mod authorization;
pub mod client;
pub mod crypto;
pub mod password;
pub mod rate_limit;
