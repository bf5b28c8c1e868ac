//! Profile route handler.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::UserProfile;
use crate::state::AppState;

/// Profile of the authenticated user.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.users().profile(&ctx.username).await?.ok_or_else(|| {
        // Token validated but the record is gone: the store and the
        // credential issuer disagree, which is a server-side problem.
        AppError::Internal(format!(
            "authenticated user {} missing from store",
            ctx.username
        ))
    })?;

    Ok(Json(profile))
}
