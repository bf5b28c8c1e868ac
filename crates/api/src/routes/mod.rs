//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (stores reachable)
//!
//! # Auth
//! POST /api/auth/register       - Create an account
//! POST /api/auth/login          - Issue a bearer token
//! POST /api/auth/logout         - Revoke the presented token
//!
//! # Cart (optional bearer; anonymous carts via cart_session cookie)
//! GET    /api/cart              - Current cart contents
//! POST   /api/cart/add          - Add an item
//! DELETE /api/cart/{product_id} - Remove an item
//!
//! # Profile (requires bearer)
//! GET  /api/profile             - Account profile
//! ```
//!
//! Everything under `/api` sits behind the rate limiter; the cart group
//! additionally runs the cart-identity resolver.

pub mod auth;
pub mod cart;
pub mod profile;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::middleware::{rate_limit, resolve_cart_identity};
use crate::state::AppState;

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
fn cart_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/{product_id}", delete(cart::remove))
        .layer(from_fn_with_state(state.clone(), resolve_cart_identity))
}

/// Create the rate-limited `/api` router.
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes(state))
        .route("/profile", get(profile::show))
        .layer(from_fn_with_state(state.clone(), rate_limit))
}

/// Create the full application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies connectivity to the credential store and the cache before
/// returning OK. Returns 503 Service Unavailable otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let users = state.users().ping().await;
    let cache = state.cache().ping().await;

    match (users, cache) {
        (Ok(()), Ok(())) => StatusCode::OK,
        (users, cache) => {
            tracing::warn!(
                database_ok = users.is_ok(),
                cache_ok = cache.is_ok(),
                "readiness check failed"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
