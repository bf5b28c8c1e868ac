//! Authentication service.
//!
//! Credential issuance and validation: registration, login, logout
//! (token revocation), and bearer-token authentication for protected
//! and optional-auth routes.

mod error;
mod hasher;
mod revocation;
mod token;

pub use error::AuthError;
pub use hasher::{Argon2Hasher, HashConfigError, HashError, PasswordHasher};
pub use revocation::RevocationList;
pub use token::{Claims, TokenError, TokenService};

use std::sync::Arc;

use tracing::instrument;

use grillpoint_core::{Email, Username};

use crate::db::{RepositoryError, UserStore};
use crate::models::AuthContext;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
///
/// All dependencies are injected at construction; the service holds no
/// global state.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
    revocation: RevocationList,
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
        revocation: RevocationList,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            revocation,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input,
    /// `AuthError::UserAlreadyExists` for a taken username,
    /// `AuthError::PasswordHash` / `AuthError::Repository` for
    /// infrastructure failures.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let digest = self.hasher.hash(password).map_err(|_| AuthError::PasswordHash)?;

        self.users
            .create(&username, &digest, &email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(username = %username, "user registered");
        Ok(())
    }

    /// Authenticate a username/password pair and issue a bearer token.
    ///
    /// Unknown users and wrong passwords collapse into the same
    /// `AuthError::InvalidCredentials`; the distinction is only logged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for empty fields,
    /// `AuthError::InvalidCredentials` for a failed match,
    /// `AuthError::TokenSigning` / `AuthError::Repository` for
    /// infrastructure failures.
    #[instrument(skip_all)]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput);
        }

        let Ok(username) = Username::parse(username) else {
            // A name that cannot parse cannot be registered either.
            tracing::warn!("login attempt with malformed username");
            return Err(AuthError::InvalidCredentials);
        };

        let digest = self
            .users
            .password_hash(&username)
            .await?
            .ok_or_else(|| {
                tracing::warn!(username = %username, "login attempt for unknown user");
                AuthError::InvalidCredentials
            })?;

        match self.hasher.verify(&digest, password) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(username = %username, "invalid password attempt");
                return Err(AuthError::InvalidCredentials);
            }
            Err(HashError::MalformedDigest) => {
                tracing::error!(username = %username, "stored password digest is malformed");
                return Err(AuthError::InvalidCredentials);
            }
            Err(_) => return Err(AuthError::PasswordHash),
        }

        let token = self
            .tokens
            .issue(&username)
            .map_err(|_| AuthError::TokenSigning)?;

        tracing::info!(username = %username, "user logged in");
        Ok(token)
    }

    /// Revoke the presented bearer token.
    ///
    /// The token does not have to validate: logout of an expired or
    /// garbled token still succeeds (the denylist TTL falls back to a
    /// configured bound when the expiry cannot be read).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` for an empty header and
    /// `AuthError::Cache` when the revocation store is unavailable -
    /// logout must report failure rather than silently succeed.
    #[instrument(skip_all)]
    pub async fn logout(&self, bearer: &str) -> Result<(), AuthError> {
        let raw = strip_bearer(bearer);
        if raw.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let remaining = self.tokens.remaining_lifetime(raw);
        self.revocation.revoke(raw, remaining).await?;

        tracing::info!("token revoked");
        Ok(())
    }

    /// Authenticate a bearer header value.
    ///
    /// Checks, in order: revocation (on the raw string, before any claim
    /// is read), then signature and expiry. A revocation-store error is
    /// fail-closed: it surfaces as an infrastructure error, never as
    /// "not revoked".
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken`, `AuthError::TokenRevoked`,
    /// `AuthError::InvalidToken`, or `AuthError::Cache`.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, bearer: &str) -> Result<AuthContext, AuthError> {
        let raw = strip_bearer(bearer);
        if raw.is_empty() {
            return Err(AuthError::MissingToken);
        }

        if self.revocation.is_revoked(raw).await? {
            tracing::warn!("rejected revoked token");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.tokens.validate(raw).map_err(|_| AuthError::InvalidToken)?;
        let username = Username::parse(&claims.username).map_err(|err| {
            tracing::warn!(error = %err, "token carries malformed username claim");
            AuthError::InvalidToken
        })?;

        Ok(AuthContext {
            username,
            token: raw.to_owned(),
        })
    }
}

/// Strip an optional `Bearer ` prefix and surrounding whitespace.
fn strip_bearer(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

/// Validate password requirements at registration.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidInput);
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
