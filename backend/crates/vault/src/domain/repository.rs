//! Repository Traits
//!
//! Storage collaborator interface. `Ok(None)` is the not-found signal;
//! `Err` is always a storage failure.

use crate::domain::entity::{user::User, user_data::UserData};
use crate::error::VaultResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find user by name
    async fn find_user_by_name(&self, name: &str) -> VaultResult<Option<User>>;

    /// Find user by the base64 encoding of their API key
    async fn find_user_by_key(&self, key: &str) -> VaultResult<Option<User>>;

    /// Insert a new user. A taken name yields `VaultError::UserAlreadyExists`.
    async fn insert_user(&self, user: &User) -> VaultResult<()>;

    /// Replace the user's API key (base64)
    async fn set_user_key(&self, name: &str, key: &str) -> VaultResult<()>;
}

/// User data repository trait
#[trait_variant::make(UserDataRepository: Send)]
pub trait LocalUserDataRepository {
    /// Stored content for a user
    async fn get_user_data(&self, name: &str) -> VaultResult<Option<UserData>>;

    /// Insert or overwrite the user's content
    async fn replace_user_data(&self, data: &UserData) -> VaultResult<()>;
}
