//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::AppConfig;
use crate::db::UserStore;
use crate::middleware::FixedWindowLimiter;
use crate::services::auth::{Argon2Hasher, AuthService, HashConfigError, PasswordHasher, RevocationList, TokenService};
use crate::services::cart::CartService;

/// Error constructing the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    HashParams(#[from] HashConfigError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. All components are wired
/// here, explicitly, from the injected store implementations - there is
/// no global registry to look things up in.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    users: Arc<dyn UserStore>,
    cache: Arc<dyn CacheStore>,
    auth: AuthService,
    carts: CartService,
    limiter: FixedWindowLimiter,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `users` - Credential store implementation
    /// * `cache` - Cache store implementation
    ///
    /// # Errors
    ///
    /// Returns an error if the configured Argon2 parameters are invalid.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Self, StateError> {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new(&config.hashing)?);
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
        let revocation = RevocationList::new(Arc::clone(&cache), config.revocation_fallback_ttl);
        let auth = AuthService::new(Arc::clone(&users), hasher, tokens, revocation);
        let carts = CartService::new(Arc::clone(&cache), config.cart_ttl);
        let limiter = FixedWindowLimiter::new(Arc::clone(&cache), config.rate_limit);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                cache,
                auth,
                carts,
                limiter,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the credential store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get a reference to the cache store.
    #[must_use]
    pub fn cache(&self) -> &dyn CacheStore {
        self.inner.cache.as_ref()
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Get a reference to the rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &FixedWindowLimiter {
        &self.inner.limiter
    }
}
