//! Request-scoped identity types.
//!
//! Both types are inserted into request extensions by the middleware in
//! [`crate::middleware`] and read back by handlers through typed
//! extractors, so no handler ever deals with raw header or cookie state.

use core::fmt;

use grillpoint_core::Username;

/// Identity of an authenticated request.
///
/// Produced only after the bearer token passed signature, expiry, and
/// revocation checks.
#[derive(Clone)]
pub struct AuthContext {
    /// Username embedded in the validated token.
    pub username: Username,
    /// The raw validated token. Kept because it scopes the
    /// authenticated cart and is what logout revokes.
    pub token: String,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The identity a cart is keyed by.
///
/// Exactly one variant applies per request. The namespaced cache keys
/// keep the two spaces from ever colliding.
#[derive(Clone)]
pub enum CartIdentity {
    /// Authenticated: scoped to the exact login session via the raw token.
    User {
        /// The validated bearer token.
        token: String,
    },
    /// Anonymous: scoped to the `cart_session` cookie id.
    Session {
        /// Server-generated session id.
        id: String,
    },
}

impl CartIdentity {
    /// The cache key this identity's cart lives under.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::User { token } => format!("cart:user:{token}"),
            Self::Session { id } => format!("cart:session:{id}"),
        }
    }
}

impl fmt::Debug for CartIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { .. } => f.debug_struct("CartIdentity::User").finish_non_exhaustive(),
            Self::Session { id } => f
                .debug_struct("CartIdentity::Session")
                .field("id", id)
                .finish(),
        }
    }
}
