//! In-memory credential store.
//!
//! Mirrors the `PostgreSQL` store's contract (including the conflict on
//! duplicate usernames) for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use grillpoint_core::{Email, Username};

use super::{RepositoryError, UserStore};
use crate::models::user::UserProfile;

struct StoredUser {
    password_hash: String,
    email: Email,
    bonus: i64,
}

/// Credential store backed by a process-local map.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, StoredUser>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredUser>> {
        self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        email: &Email,
    ) -> Result<(), RepositoryError> {
        let mut users = self.lock();
        if users.contains_key(username.as_str()) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }
        users.insert(
            username.as_str().to_owned(),
            StoredUser {
                password_hash: password_hash.to_owned(),
                email: email.clone(),
                bonus: 0,
            },
        );
        Ok(())
    }

    async fn password_hash(&self, username: &Username) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .lock()
            .get(username.as_str())
            .map(|user| user.password_hash.clone()))
    }

    async fn profile(&self, username: &Username) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.lock().get(username.as_str()).map(|user| UserProfile {
            username: username.clone(),
            email: user.email.clone(),
            bonus: user.bonus,
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
