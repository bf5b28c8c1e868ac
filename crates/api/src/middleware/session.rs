//! Cart identity resolution.
//!
//! Derives the identity a cart is keyed by: a validated bearer token
//! when one is presented, otherwise an anonymous session id carried in
//! a long-lived, http-only cookie. The resolver always produces an
//! identity - a client with neither credential gets a fresh session
//! cookie on the way out.

use std::time::Duration;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::CartIdentity;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cart_session";

/// Middleware resolving the [`CartIdentity`] for cart routes.
///
/// Order:
/// 1. A bearer token that fully authenticates (signature, expiry, not
///    revoked) yields the authenticated identity; the raw token string
///    scopes the cart to this exact login session.
/// 2. An invalid, expired, or revoked token degrades to the anonymous
///    path - but a revocation-store outage fails the request closed.
/// 3. Anonymous: the `cart_session` cookie, created here on first
///    contact.
pub async fn resolve_cart_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(header) = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        match state.auth().authenticate(header).await {
            Ok(ctx) => {
                let identity = CartIdentity::User {
                    token: ctx.token.clone(),
                };
                req.extensions_mut().insert(ctx);
                req.extensions_mut().insert(identity);
                return next.run(req).await;
            }
            Err(err) if err.is_infrastructure() => {
                return AppError::Auth(err).into_response();
            }
            Err(err) => {
                tracing::debug!(error = %err, "optional auth failed, using session identity");
            }
        }
    }

    let (session_id, created) = match session_cookie(req.headers()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    req.extensions_mut().insert(CartIdentity::Session {
        id: session_id.clone(),
    });

    let mut response = next.run(req).await;
    if created {
        let cookie = set_cookie_value(
            &session_id,
            state.config().cart_ttl,
            state.config().cookie_secure,
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

impl<S> FromRequestParts<S> for CartIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::Internal("cart identity resolver not applied to this route".to_owned())
        })
    }
}

/// Read the session id from the request's `Cookie` headers.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
}

/// Build the `Set-Cookie` value for a freshly created session id.
fn set_cookie_value(session_id: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; Max-Age={}; Path=/; HttpOnly",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
