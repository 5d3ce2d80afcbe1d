//! In-Memory Repository
//!
//! Map-backed implementation for tests and ephemeral runs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::{user::User, user_data::UserData};
use crate::domain::repository::{UserDataRepository, UserRepository};
use crate::error::{VaultError, VaultResult};

#[derive(Clone, Default)]
pub struct InMemoryVaultRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryVaultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryVaultRepository {
    async fn find_user_by_name(&self, name: &str) -> VaultResult<Option<User>> {
        Ok(self.users.read().await.get(name).cloned())
    }

    async fn find_user_by_key(&self, key: &str) -> VaultResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.api_key.as_deref() == Some(key))
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> VaultResult<()> {
        match self.users.write().await.entry(user.name.clone()) {
            Entry::Occupied(_) => Err(VaultError::UserAlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn set_user_key(&self, name: &str, key: &str) -> VaultResult<()> {
        if let Some(user) = self.users.write().await.get_mut(name) {
            user.api_key = Some(key.to_owned());
        }
        Ok(())
    }
}

impl UserDataRepository for InMemoryVaultRepository {
    async fn get_user_data(&self, name: &str) -> VaultResult<Option<UserData>> {
        Ok(self.data.read().await.get(name).map(|content| UserData {
            user_name: name.to_owned(),
            content: content.clone(),
        }))
    }

    async fn replace_user_data(&self, data: &UserData) -> VaultResult<()> {
        self.data
            .write()
            .await
            .insert(data.user_name.clone(), data.content.clone());
        Ok(())
    }
}
