//! Domain Layer
//!
//! Contains entities, value objects, the credential verification service,
//! and repository traits.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{user::User, user_data::UserData};
pub use repository::{UserDataRepository, UserRepository};
pub use services::CredentialVerifier;
pub use value_object::api_key::ApiKey;
