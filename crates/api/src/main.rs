//! Grillpoint API - order-taking backend.
//!
//! This binary serves the HTTP API on port 8080.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in/out
//! - `PostgreSQL` for user credential records
//! - Redis for carts, the token revocation list, and rate-limit counters
//! - Stateless HS256 bearer tokens for authenticated sessions
//!
//! # Request path
//!
//! Rate limiter first, then (per route) bearer validation plus the
//! revocation check, then the cart-identity resolver, then the handler.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grillpoint_api::cache::RedisCache;
use grillpoint_api::config::AppConfig;
use grillpoint_api::db::{self, PgUserStore};
use grillpoint_api::routes;
use grillpoint_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "grillpoint_api=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup; the schema
    // is owned by the deployment tooling.

    // Connect to the cache store
    let cache = RedisCache::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    tracing::info!("Cache connection established");

    // Build application state with explicit wiring
    let users = Arc::new(PgUserStore::new(pool));
    let state = AppState::new(config.clone(), users, Arc::new(cache))
        .expect("Failed to initialize application state");

    let app = routes::app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // ConnectInfo feeds the rate limiter's peer-address fallback.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
