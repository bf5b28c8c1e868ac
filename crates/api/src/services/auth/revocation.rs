//! Cache-backed token revocation list.
//!
//! Revoked tokens are recorded under a digest of the raw token string,
//! with a TTL matched to the token's own remaining lifetime: an entry
//! must not expire while its token is still otherwise valid, and there
//! is no reason for it to outlive the token's natural expiry.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::cache::{CacheError, CacheStore};

const KEY_PREFIX: &str = "blacklist:";
const REVOKED_MARKER: &str = "1";

/// Denylist of explicitly invalidated tokens.
pub struct RevocationList {
    cache: Arc<dyn CacheStore>,
    fallback_ttl: Duration,
}

impl RevocationList {
    /// Create a revocation list over `cache`.
    ///
    /// `fallback_ttl` bounds the entry lifetime when a token's own expiry
    /// cannot be read.
    pub fn new(cache: Arc<dyn CacheStore>, fallback_ttl: Duration) -> Self {
        Self {
            cache,
            fallback_ttl,
        }
    }

    /// Denylist key for `raw_token`: a hex SHA-256 digest, so the cache
    /// never holds the token itself.
    fn key(raw_token: &str) -> String {
        let digest = Sha256::digest(raw_token.as_bytes());
        let mut key = String::with_capacity(KEY_PREFIX.len() + digest.len() * 2);
        key.push_str(KEY_PREFIX);
        for byte in digest {
            let _ = write!(key, "{byte:02x}");
        }
        key
    }

    /// Revoke `raw_token`.
    ///
    /// `remaining` is the token's time left until its own expiry (`None`
    /// if unreadable). A token that is already expired needs no entry.
    /// The write is set-if-absent, so revoking the same token repeatedly
    /// is idempotent and never resizes the existing entry's TTL.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the store is unavailable; callers must
    /// treat that as a failed logout, never as success.
    pub async fn revoke(
        &self,
        raw_token: &str,
        remaining: Option<Duration>,
    ) -> Result<(), CacheError> {
        let ttl = match remaining {
            Some(left) if left.is_zero() => {
                tracing::debug!("token already expired, skipping denylist write");
                return Ok(());
            }
            Some(left) => left,
            None => self.fallback_ttl,
        };

        self.cache
            .set_if_absent(&Self::key(raw_token), REVOKED_MARKER, ttl)
            .await
            .map(|_| ())
    }

    /// Whether `raw_token` has been revoked.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the store is unavailable. Callers must
    /// fail closed: an error never means "not revoked".
    pub async fn is_revoked(&self, raw_token: &str) -> Result<bool, CacheError> {
        self.cache.exists(&Self::key(raw_token)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    const FALLBACK: Duration = Duration::from_secs(3600);

    fn revocation_list() -> (RevocationList, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let list = RevocationList::new(cache.clone(), FALLBACK);
        (list, cache)
    }

    #[tokio::test]
    async fn test_revoked_token_is_flagged() {
        let (list, _) = revocation_list();
        list.revoke("token-a", Some(Duration::from_secs(600)))
            .await
            .unwrap();

        assert!(list.is_revoked("token-a").await.unwrap());
        assert!(!list.is_revoked("token-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_ttl_matches_remaining_lifetime() {
        let (list, cache) = revocation_list();
        let remaining = Duration::from_secs(600);
        list.revoke("token-a", Some(remaining)).await.unwrap();

        let ttl = cache.expires_in(&RevocationList::key("token-a")).unwrap();
        assert!(ttl > Duration::ZERO);
        assert!(ttl <= remaining);
    }

    #[tokio::test]
    async fn test_repeated_revoke_does_not_extend_ttl() {
        let (list, cache) = revocation_list();
        list.revoke("token-a", Some(Duration::from_secs(600)))
            .await
            .unwrap();
        list.revoke("token-a", Some(Duration::from_secs(60_000)))
            .await
            .unwrap();

        let ttl = cache.expires_in(&RevocationList::key("token-a")).unwrap();
        assert!(ttl <= Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_already_expired_token_writes_nothing() {
        let (list, cache) = revocation_list();
        list.revoke("token-a", Some(Duration::ZERO)).await.unwrap();

        assert!(cache.expires_in(&RevocationList::key("token-a")).is_none());
        // Expiry alone rejects the token, so the list need not flag it.
        assert!(!list.is_revoked("token-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_expiry_uses_fallback_ttl() {
        let (list, cache) = revocation_list();
        list.revoke("garbage-token", None).await.unwrap();

        let ttl = cache.expires_in(&RevocationList::key("garbage-token")).unwrap();
        assert!(ttl > Duration::ZERO);
        assert!(ttl <= FALLBACK);
        assert!(list.is_revoked("garbage-token").await.unwrap());
    }

    #[test]
    fn test_key_is_a_digest_not_the_token() {
        let key = RevocationList::key("my-raw-token");
        assert!(key.starts_with("blacklist:"));
        assert!(!key.contains("my-raw-token"));
        // 64 hex chars of SHA-256.
        assert_eq!(key.len(), "blacklist:".len() + 64);
    }
}
