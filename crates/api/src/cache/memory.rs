//! In-memory cache store.
//!
//! Implements the same contract as the Redis store, including per-key
//! expiry and the atomicity of `set_if_absent`/`incr_with_window` (here
//! trivially, under one mutex). Used by the test suites and for running
//! the API locally without a Redis instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{CacheError, CacheStore};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Cache store backed by a process-local map.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time until the entry at `key` expires, if the entry exists.
    ///
    /// Exposed so tests can assert TTL invariants (e.g. that a denylist
    /// entry never outlives its token).
    #[must_use]
    pub fn expires_in(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at - now)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.lock();
        entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let live = entries.get(key).is_some_and(|entry| !entry.is_expired(now));
        if live {
            return Ok(false);
        }
        entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn incr_with_window(&self, key: &str, window: Duration) -> Result<u64, CacheError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let count = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.value.parse::<u64>().unwrap_or(0).saturating_add(1)
            }
            _ => 1,
        };
        // The window is pinned to the first increment: an existing live
        // entry keeps its expiry.
        let expires_at = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => entry.expires_at,
            _ => now + window,
        };
        entries.insert(
            key.to_owned(),
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
