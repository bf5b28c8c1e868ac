//! Key-value cache store abstraction.
//!
//! The cache backs three disjoint key namespaces: revoked-token entries
//! (`blacklist:`), cart blobs (`cart:`), and rate-limit counters
//! (`ratelimit:`). The trait exposes exactly the primitives those callers
//! need, including the two atomic read-then-write operations
//! ([`CacheStore::set_if_absent`] and [`CacheStore::incr_with_window`])
//! so that no caller has to compose a racy get+set pair.
//!
//! Two implementations exist: [`RedisCache`] for production and
//! [`MemoryCache`] for tests and local development.

mod memory;
mod redis;

pub use memory::MemoryCache;
pub use redis::RedisCache;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a cache backend.
///
/// Callers treat every variant as an infrastructure failure and fail
/// closed; a cache error is never interpreted as "key absent".
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend rejected or could not complete the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Capability interface over the key-value cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the value stored at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` at `key`, replacing any existing entry and
    /// (re)starting its TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Store `value` at `key` only if the key does not exist.
    ///
    /// Returns `true` if the value was written. An existing entry keeps
    /// both its value and its TTL.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, CacheError>;

    /// Remove the entry at `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Whether an entry exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Atomically increment the counter at `key` and return the new count.
    ///
    /// The first increment of a key starts its expiry window; later
    /// increments within the window never extend it, so the counter
    /// resets (by expiring) exactly `window` after it was first touched.
    async fn incr_with_window(&self, key: &str, window: Duration) -> Result<u64, CacheError>;

    /// Backend connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), CacheError>;
}
