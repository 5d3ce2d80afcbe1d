//! Infrastructure Layer
//!
//! Storage implementations of the repository traits.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryVaultRepository;
pub use sqlite::SqliteVaultRepository;
