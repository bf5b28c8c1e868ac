//! Request rate limiting.
//!
//! A fixed-window counter per client, kept in the cache store via its
//! atomic increment-with-expiry primitive so that concurrent requests
//! never race a separate read+write pair. The gate runs before
//! authentication and therefore keys on the client address, not on any
//! decoded identity.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::cache::{CacheError, CacheStore};
use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

const KEY_PREFIX: &str = "ratelimit:";

/// Fixed-window request counter.
///
/// The first request from a client starts its window; the window never
/// slides, and the counter resets by expiring from the cache once the
/// window has elapsed.
pub struct FixedWindowLimiter {
    cache: Arc<dyn CacheStore>,
    max_requests: u64,
    window: Duration,
}

impl FixedWindowLimiter {
    /// Create a limiter over `cache` with the configured bounds.
    pub fn new(cache: Arc<dyn CacheStore>, config: RateLimitConfig) -> Self {
        Self {
            cache,
            max_requests: config.max_requests,
            window: config.window,
        }
    }

    /// Count a request from `client_key` and decide whether to admit it.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the counter store is unavailable. Callers
    /// fail closed on that.
    pub async fn allow(&self, client_key: &str) -> Result<bool, CacheError> {
        let count = self
            .cache
            .incr_with_window(&format!("{KEY_PREFIX}{client_key}"), self.window)
            .await?;
        Ok(count <= self.max_requests)
    }
}

/// Middleware gating all API traffic through the rate limiter.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    match state.limiter().allow(&client).await {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            tracing::warn!(client = %client, "rate limit exceeded");
            AppError::RateLimited.into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "rate limiter store unavailable");
            AppError::Cache(err).into_response()
        }
    }
}

/// Client key for the limiter: the forwarded client IP when a proxy
/// provides one, otherwise the peer address.
fn client_key(req: &Request) -> String {
    let headers = req.headers();

    // Try X-Forwarded-For (first IP in the chain)
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return ip.to_string();
    }

    // Try X-Real-IP
    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return ip.to_string();
    }

    // Fall back to the socket peer address
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |info| info.0.ip().to_string())
}
