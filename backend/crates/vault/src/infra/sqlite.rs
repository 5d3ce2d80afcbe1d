//! SQLite Repository Implementations

use platform::password::Credential;
use sqlx::SqlitePool;

use crate::domain::entity::{user::User, user_data::UserData};
use crate::domain::repository::{UserDataRepository, UserRepository};
use crate::error::{VaultError, VaultResult};

/// SQLite-backed vault repository
#[derive(Clone)]
pub struct SqliteVaultRepository {
    pool: SqlitePool,
}

impl SqliteVaultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn run_migrations(&self) -> VaultResult<()> {
        sqlx::migrate!("../../../database/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| VaultError::Internal(format!("Migration failed: {}", e)))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for SqliteVaultRepository {
    async fn find_user_by_name(&self, name: &str) -> VaultResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT name, salt, password_hash, api_key
            FROM users
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_user_by_key(&self, key: &str) -> VaultResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT name, salt, password_hash, api_key
            FROM users
            WHERE api_key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn insert_user(&self, user: &User) -> VaultResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (name, salt, password_hash, api_key)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.credential.salt[..])
        .bind(&user.credential.password_hash)
        .bind(user.api_key.as_deref())
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn set_user_key(&self, name: &str, key: &str) -> VaultResult<()> {
        sqlx::query("UPDATE users SET api_key = ? WHERE name = ?")
            .bind(key)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// User Data Repository Implementation
// ============================================================================

impl UserDataRepository for SqliteVaultRepository {
    async fn get_user_data(&self, name: &str) -> VaultResult<Option<UserData>> {
        let row = sqlx::query_as::<_, UserDataRow>(
            "SELECT user_name, content FROM user_data WHERE user_name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserData {
            user_name: r.user_name,
            content: r.content,
        }))
    }

    async fn replace_user_data(&self, data: &UserData) -> VaultResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_data (user_name, content)
            VALUES (?, ?)
            ON CONFLICT(user_name) DO UPDATE SET content = excluded.content
            "#,
        )
        .bind(&data.user_name)
        .bind(&data.content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// A taken name surfaces as a domain error, everything else as storage failure.
fn map_insert_error(e: sqlx::Error) -> VaultError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return VaultError::UserAlreadyExists;
        }
    }
    VaultError::Database(e)
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    name: String,
    salt: Vec<u8>,
    password_hash: Vec<u8>,
    api_key: Option<String>,
}

impl UserRow {
    fn into_user(self) -> VaultResult<User> {
        let credential = Credential::from_parts(self.password_hash, &self.salt).ok_or_else(|| {
            VaultError::Internal(format!("Invalid salt length for user {}", self.name))
        })?;

        Ok(User {
            name: self.name,
            credential,
            api_key: self.api_key,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserDataRow {
    user_name: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{KdfParams, PasswordHasher};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repo() -> SqliteVaultRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let repo = SqliteVaultRepository::new(pool);
        repo.run_migrations().await.unwrap();
        repo
    }

    fn user(name: &str) -> User {
        let hasher = PasswordHasher::new(KdfParams {
            time_cost: 1,
            memory_kib: 64,
            parallelism: 1,
            output_len: 32,
        })
        .unwrap();
        User::new(name, hasher.new_credential(b"hunter2").unwrap())
    }

    #[tokio::test]
    async fn test_insert_and_find_by_name() {
        let repo = repo().await;
        let alice = user("alice");
        repo.insert_user(&alice).await.unwrap();

        let found = repo.find_user_by_name("alice").await.unwrap().unwrap();
        assert_eq!(found.name, "alice");
        assert_eq!(found.credential, alice.credential);
        assert!(found.api_key.is_none());

        assert!(repo.find_user_by_name("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_user_already_exists() {
        let repo = repo().await;
        repo.insert_user(&user("alice")).await.unwrap();

        let err = repo.insert_user(&user("alice")).await.unwrap_err();
        assert!(matches!(err, VaultError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_set_key_replaces_previous() {
        let repo = repo().await;
        repo.insert_user(&user("alice")).await.unwrap();

        repo.set_user_key("alice", "Zmlyc3Q=").await.unwrap();
        repo.set_user_key("alice", "c2Vjb25k").await.unwrap();

        assert!(repo.find_user_by_key("Zmlyc3Q=").await.unwrap().is_none());
        let found = repo.find_user_by_key("c2Vjb25k").await.unwrap().unwrap();
        assert_eq!(found.name, "alice");
        assert_eq!(found.api_key.as_deref(), Some("c2Vjb25k"));
    }

    #[tokio::test]
    async fn test_user_data_upsert() {
        let repo = repo().await;
        repo.insert_user(&user("alice")).await.unwrap();

        assert!(repo.get_user_data("alice").await.unwrap().is_none());

        repo.replace_user_data(&UserData::from_body("alice", b"hello"))
            .await
            .unwrap();
        repo.replace_user_data(&UserData::from_body("alice", b"world"))
            .await
            .unwrap();

        let data = repo.get_user_data("alice").await.unwrap().unwrap();
        assert_eq!(data.content, "world");
    }
}
