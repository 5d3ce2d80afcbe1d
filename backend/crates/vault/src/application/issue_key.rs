//! Issue Key Use Case
//!
//! A fresh key is generated for every request and returned with 200
//! whatever the credentials were. Only a verified user's key is persisted,
//! replacing the previous one.

use std::sync::Arc;

use crate::application::gate::{AuthGate, PasswordCheck, PasswordCredentials};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::api_key::ApiKey;
use crate::error::VaultResult;

#[derive(Debug)]
pub struct IssueKeyOutput {
    pub key: ApiKey,
    /// Whether the key was bound to an account
    pub persisted: bool,
}

pub struct IssueKeyUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    gate: Arc<AuthGate<R>>,
}

impl<R> IssueKeyUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, gate: Arc<AuthGate<R>>) -> Self {
        Self { user_repo, gate }
    }

    pub async fn execute(&self, credentials: PasswordCredentials) -> VaultResult<IssueKeyOutput> {
        let key = ApiKey::generate()?;

        let persisted = match self.gate.check_password(&credentials).await? {
            PasswordCheck::Verified(user) => {
                self.user_repo.set_user_key(&user.name, &key.encode()).await?;
                tracing::info!(user = %user.name, "API key issued");
                true
            }
            PasswordCheck::UnknownUser | PasswordCheck::Mismatch => {
                tracing::debug!(user = %credentials.username, "Unbound API key returned");
                false
            }
        };

        Ok(IssueKeyOutput { key, persisted })
    }
}
