//! Authentication route handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Registration request body.
///
/// Fields default to empty so that a missing field reads as an empty
/// one; both are rejected the same way.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Generic success message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Issued token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload.map_err(|err| {
        tracing::warn!(error = %err, "malformed registration payload");
        AppError::BadRequest("Invalid input".to_owned())
    })?;

    state
        .auth()
        .register(&req.username, &req.password, &req.email)
        .await?;

    Ok(Json(MessageResponse {
        message: "User registered successfully".to_owned(),
    }))
}

/// Authenticate and issue a bearer token.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload.map_err(|err| {
        tracing::warn!(error = %err, "malformed login payload");
        AppError::BadRequest("Invalid input".to_owned())
    })?;

    let token = state.auth().login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse { token }))
}

/// Revoke the presented bearer token.
///
/// A missing token is a 400 here (the client simply forgot the header),
/// unlike on protected routes where it is a 401.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    state.auth().logout(header).await.map_err(|err| match err {
        AuthError::MissingToken => AppError::BadRequest("Token missing".to_owned()),
        other => AppError::Auth(other),
    })?;

    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_owned(),
    }))
}
