//! Register Use Case

use std::sync::Arc;

use crate::application::gate::{AuthGate, PasswordCredentials};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{VaultError, VaultResult};

pub struct RegisterUseCase<R>
where
    R: UserRepository,
{
    user_repo: Arc<R>,
    gate: Arc<AuthGate<R>>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository,
{
    pub fn new(user_repo: Arc<R>, gate: Arc<AuthGate<R>>) -> Self {
        Self { user_repo, gate }
    }

    pub async fn execute(&self, credentials: PasswordCredentials) -> VaultResult<()> {
        if self
            .user_repo
            .find_user_by_name(&credentials.username)
            .await?
            .is_some()
        {
            return Err(VaultError::UserAlreadyExists);
        }

        let credential = self.gate.new_credential(&credentials.password).await?;
        let user = User::new(credentials.username, credential);

        // A concurrent registration can still win between the lookup and here;
        // the repository reports that as UserAlreadyExists.
        self.user_repo.insert_user(&user).await?;

        tracing::info!(user = %user.name, "User registered");
        Ok(())
    }
}
