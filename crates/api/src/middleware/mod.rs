//! Request middleware and extractors.
//!
//! Per-request order on the `/api` surface:
//!
//! 1. [`rate_limit`] - gates every request before anything else runs
//! 2. [`resolve_cart_identity`] - cart routes only; optional auth plus
//!    the anonymous session cookie
//! 3. [`RequireAuth`] - extractor on protected routes

mod auth;
mod rate_limit;
mod session;

pub use auth::RequireAuth;
pub use rate_limit::{FixedWindowLimiter, rate_limit};
pub use session::{SESSION_COOKIE_NAME, resolve_cart_identity};
