//! Data Use Cases
//!
//! Key-authenticated read and overwrite of a user's single text slot.

use std::sync::Arc;

use crate::application::gate::AuthGate;
use crate::domain::entity::user_data::UserData;
use crate::domain::repository::{UserDataRepository, UserRepository};
use crate::domain::value_object::api_key::ApiKey;
use crate::error::VaultResult;

pub struct StoreDataUseCase<R>
where
    R: UserRepository + UserDataRepository,
{
    repo: Arc<R>,
    gate: Arc<AuthGate<R>>,
}

impl<R> StoreDataUseCase<R>
where
    R: UserRepository + UserDataRepository,
{
    pub fn new(repo: Arc<R>, gate: Arc<AuthGate<R>>) -> Self {
        Self { repo, gate }
    }

    /// Overwrite the caller's content with `body`, dropping invalid UTF-8.
    pub async fn execute(&self, key: &ApiKey, body: &[u8]) -> VaultResult<()> {
        let user = self.gate.authenticate_key(key).await?;
        let data = UserData::from_body(user.name, body);
        self.repo.replace_user_data(&data).await?;

        tracing::info!(user = %data.user_name, bytes = data.content.len(), "User data stored");
        Ok(())
    }
}

pub struct LoadDataUseCase<R>
where
    R: UserRepository + UserDataRepository,
{
    repo: Arc<R>,
    gate: Arc<AuthGate<R>>,
}

impl<R> LoadDataUseCase<R>
where
    R: UserRepository + UserDataRepository,
{
    pub fn new(repo: Arc<R>, gate: Arc<AuthGate<R>>) -> Self {
        Self { repo, gate }
    }

    /// Stored content, or an empty string if nothing was written yet.
    pub async fn execute(&self, key: &ApiKey) -> VaultResult<String> {
        let user = self.gate.authenticate_key(key).await?;
        let content = self
            .repo
            .get_user_data(&user.name)
            .await?
            .map(|data| data.content)
            .unwrap_or_default();
        Ok(content)
    }
}
