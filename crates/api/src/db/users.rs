//! User repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;

use grillpoint_core::{Email, Username};

use super::RepositoryError;
use crate::models::user::UserProfile;

/// Capability interface over the credential store.
///
/// The password hash is only ever exposed through [`UserStore::password_hash`];
/// profile reads never carry it.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken,
    /// `RepositoryError::Database` for other failures.
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        email: &Email,
    ) -> Result<(), RepositoryError>;

    /// Fetch the stored password hash for `username`, if the user exists.
    async fn password_hash(&self, username: &Username) -> Result<Option<String>, RepositoryError>;

    /// Fetch the profile for `username`, if the user exists.
    async fn profile(&self, username: &Username) -> Result<Option<UserProfile>, RepositoryError>;

    /// Backend connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Production credential store over `PostgreSQL`.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        email: &Email,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (username, password_hash, email) VALUES ($1, $2, $3)")
            .bind(username.as_str())
            .bind(password_hash)
            .bind(email.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("username already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(())
    }

    async fn password_hash(&self, username: &Username) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = $1",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn profile(&self, username: &Username) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT username, email, bonus FROM users WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let username: String = row.try_get("username")?;
                let email: String = row.try_get("email")?;
                let bonus: i64 = row.try_get("bonus")?;

                let username = Username::parse(&username).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
                })?;
                let email = Email::parse(&email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?;

                Ok(Some(UserProfile {
                    username,
                    email,
                    bonus,
                }))
            }
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
