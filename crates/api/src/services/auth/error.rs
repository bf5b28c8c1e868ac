//! Authentication error types.

use thiserror::Error;

use grillpoint_core::{EmailError, UsernameError};

use crate::cache::CacheError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// Client-facing responses collapse most of these into generic messages;
/// the distinct variants exist so the real cause can be logged.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field is missing or empty.
    #[error("invalid input")]
    InvalidInput,

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong password or unknown user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username is already registered.
    #[error("username already exists")]
    UserAlreadyExists,

    /// No bearer token was presented.
    #[error("missing bearer token")]
    MissingToken,

    /// Malformed, mis-signed, or expired token.
    #[error("invalid token")]
    InvalidToken,

    /// Token is on the revocation list.
    #[error("token revoked")]
    TokenRevoked,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing failed.
    #[error("token signing error")]
    TokenSigning,

    /// Credential store error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Revocation list store error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl AuthError {
    /// Whether this is an infrastructure failure (5xx) rather than a
    /// client-attributable rejection.
    ///
    /// The optional-auth path uses this to decide between degrading to an
    /// anonymous identity (client error) and failing the request closed
    /// (infrastructure error).
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::PasswordHash | Self::TokenSigning | Self::Repository(_) | Self::Cache(_)
        )
    }
}
