//! End-to-end tests for the Grillpoint API.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`,
//! wired against the in-memory store implementations, so the full
//! middleware chain (rate limiter, identity resolution, auth
//! extractors) runs exactly as in production - only the two external
//! stores are swapped out.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p grillpoint-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use grillpoint_api::cache::MemoryCache;
use grillpoint_api::config::{AppConfig, HashingConfig, RateLimitConfig};
use grillpoint_api::db::MemoryUserStore;
use grillpoint_api::routes;
use grillpoint_api::state::AppState;

/// A configuration suitable for tests: generous rate limit, low-cost
/// hashing, fixed high-entropy secret.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://unused-in-tests"),
        redis_url: SecretString::from("redis://unused-in-tests"),
        host: "127.0.0.1".parse().expect("valid address"),
        port: 0,
        jwt_secret: SecretString::from("kX9#mP2$vL8@qR4!wT6&yU0*zA3^bC5j"),
        token_ttl: Duration::from_secs(3600),
        cart_ttl: Duration::from_secs(30 * 24 * 3600),
        revocation_fallback_ttl: Duration::from_secs(3600),
        rate_limit: RateLimitConfig {
            max_requests: 10_000,
            window: Duration::from_secs(60),
        },
        cookie_secure: false,
        hashing: HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// Build the application router over in-memory stores.
#[must_use]
pub fn test_app() -> Router {
    test_app_with_config(test_config())
}

/// Build the application router over in-memory stores with a custom
/// configuration.
#[must_use]
pub fn test_app_with_config(config: AppConfig) -> Router {
    let state = AppState::new(
        config,
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryCache::new()),
    )
    .expect("test state must construct");
    routes::app(state)
}

/// A request about to be sent to the test app.
pub struct TestRequest {
    builder: axum::http::request::Builder,
    body: Body,
}

impl TestRequest {
    /// Start a request with no body.
    #[must_use]
    pub fn new(method: &str, uri: &str) -> Self {
        Self {
            builder: Request::builder().method(method).uri(uri),
            body: Body::empty(),
        }
    }

    /// Start a request with a JSON body.
    #[must_use]
    pub fn json(method: &str, uri: &str, body: &Value) -> Self {
        Self {
            builder: Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json"),
            body: Body::from(body.to_string()),
        }
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self
            .builder
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    /// Attach a raw header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Send the request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or routed.
    pub async fn send(self, app: &Router) -> Response<Body> {
        let request = self.builder.body(self.body).expect("request must build");
        app.clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

/// Read a response's status and JSON body.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body must be JSON")
    };
    (status, value)
}

/// Extract the `cart_session` cookie value from a response, if set.
#[must_use]
pub fn session_cookie_from(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            cookie
                .split(';')
                .next()
                .and_then(|pair| pair.trim().strip_prefix("cart_session="))
                .map(ToOwned::to_owned)
        })
}

/// Register `username` and log in, returning the issued token.
///
/// # Panics
///
/// Panics if registration or login fails.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let (status, _) = read_json(
        TestRequest::json(
            "POST",
            "/api/auth/register",
            &serde_json::json!({
                "username": username,
                "password": password,
                "email": format!("{username}@example.com"),
            }),
        )
        .send(app)
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration must succeed");

    let (status, body) = read_json(
        TestRequest::json(
            "POST",
            "/api/auth/login",
            &serde_json::json!({ "username": username, "password": password }),
        )
        .send(app)
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login must succeed");

    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_owned()
}
