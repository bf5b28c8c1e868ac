//! Unified request error handling.
//!
//! Provides a unified `AppError` type mapping every layer's errors onto
//! the HTTP taxonomy. All route handlers return `Result<T, AppError>`.
//! Client responses carry only generic messages as JSON
//! (`{"error": "..."}`); the real cause is logged server-side.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::cache::CacheError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cache operation failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Bad request from the client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is attributable to the server rather than the
    /// client.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Cart(_) | Self::Database(_) | Self::Cache(_) | Self::Internal(_) => true,
            Self::Auth(err) => err.is_infrastructure(),
            Self::BadRequest(_) | Self::RateLimited => false,
        }
    }

    /// HTTP status and client-safe message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Auth(err) => auth_status_and_message(err),
            Self::Cart(_) | Self::Database(_) | Self::Cache(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_owned(),
            ),
        }
    }
}

/// Map auth errors onto the wire taxonomy.
///
/// Every 401 collapses onto one of two generic messages so that
/// responses never leak whether a username exists or why exactly a
/// token was rejected.
fn auth_status_and_message(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
        }
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing token".to_owned()),
        AuthError::InvalidToken | AuthError::TokenRevoked => {
            (StatusCode::UNAUTHORIZED, "Invalid token".to_owned())
        }
        AuthError::UserAlreadyExists => {
            (StatusCode::BAD_REQUEST, "Username already exists".to_owned())
        }
        AuthError::InvalidInput
        | AuthError::InvalidUsername(_)
        | AuthError::InvalidEmail(_)
        | AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, "Invalid input".to_owned()),
        AuthError::PasswordHash
        | AuthError::TokenSigning
        | AuthError::Repository(_)
        | AuthError::Cache(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_owned(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_errors_are_400() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidInput)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::BadRequest("Invalid format".to_owned())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_duplicate_username_is_400_with_specific_message() {
        let err = AppError::Auth(AuthError::UserAlreadyExists);
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Username already exists");
    }

    #[test]
    fn test_auth_failures_are_401_and_collapsed() {
        let (status, message) =
            AppError::Auth(AuthError::InvalidCredentials).status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Invalid credentials");

        // Revoked and invalid tokens are indistinguishable on the wire.
        let (_, revoked) = AppError::Auth(AuthError::TokenRevoked).status_and_message();
        let (_, invalid) = AppError::Auth(AuthError::InvalidToken).status_and_message();
        assert_eq!(revoked, invalid);
    }

    #[test]
    fn test_infrastructure_errors_are_500_and_generic() {
        let err = AppError::Auth(AuthError::Cache(CacheError::Backend(
            "connection refused to redis://10.0.0.3".to_owned(),
        )));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Internal detail never reaches the client.
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_rate_limited_is_429() {
        assert_eq!(status_of(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
    }
}
