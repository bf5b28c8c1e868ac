//! Authentication extractor.
//!
//! Provides the extractor for requiring bearer authentication in route
//! handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::models::AuthContext;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid, unrevoked bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(ctx): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", ctx.username)
/// }
/// ```
pub struct RequireAuth(pub AuthContext);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse an identity already established by the cart-identity
        // middleware, if this route sits behind it.
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(Self(ctx.clone()));
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Auth(AuthError::MissingToken))?;

        let ctx = state.auth().authenticate(header).await?;
        Ok(Self(ctx))
    }
}
