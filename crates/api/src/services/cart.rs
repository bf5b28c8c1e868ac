//! Cart store over the cache.
//!
//! Each identity's cart is one serialized blob at its namespaced cache
//! key, with a long TTL refreshed on every write. Mutations are a
//! read-modify-write over that blob: two concurrent mutations of the
//! same cart can lose one of the updates. That race is an accepted
//! trade-off for this low-stakes, eventually-consistent structure (see
//! DESIGN.md) rather than something this service tries to lock around.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::instrument;

use crate::cache::{CacheError, CacheStore};
use crate::models::{Cart, CartIdentity, CartItem};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cache backend failed.
    #[error("cart store error: {0}")]
    Store(#[from] CacheError),

    /// The cart could not be serialized for storage.
    #[error("cart serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read and mutate carts keyed by [`CartIdentity`].
pub struct CartService {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CartService {
    /// Create a cart service over `cache` with the configured record TTL.
    pub fn new(cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Fetch the cart for `identity`.
    ///
    /// A missing record is an empty cart, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cache is unavailable.
    #[instrument(skip_all)]
    pub async fn get(&self, identity: &CartIdentity) -> Result<Cart, CartError> {
        self.load(&identity.cache_key()).await
    }

    /// Add `item` to the cart for `identity`, accumulating quantity when
    /// the product is already present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cache is unavailable.
    #[instrument(skip_all, fields(product_id = item.product_id))]
    pub async fn add(&self, identity: &CartIdentity, item: CartItem) -> Result<Cart, CartError> {
        let key = identity.cache_key();
        let mut cart = self.load(&key).await?;
        cart.upsert(item);
        self.store(&key, &cart).await?;
        Ok(cart)
    }

    /// Remove the line for `product_id` from the cart for `identity`.
    ///
    /// Removing an absent product succeeds and leaves the cart as-is.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cache is unavailable.
    #[instrument(skip(self, identity))]
    pub async fn remove(
        &self,
        identity: &CartIdentity,
        product_id: i64,
    ) -> Result<Cart, CartError> {
        let key = identity.cache_key();
        let mut cart = self.load(&key).await?;
        cart.remove(product_id);
        self.store(&key, &cart).await?;
        Ok(cart)
    }

    async fn load(&self, key: &str) -> Result<Cart, CartError> {
        match self.cache.get(key).await? {
            None => Ok(Cart::default()),
            Some(raw) => Ok(Cart::from_json(&raw).unwrap_or_else(|| {
                tracing::warn!(key, "stored cart failed to decode, treating as empty");
                Cart::default()
            })),
        }
    }

    /// Write back and refresh the TTL.
    async fn store(&self, key: &str, cart: &Cart) -> Result<(), CartError> {
        self.cache.set(key, &cart.to_json()?, self.ttl).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    const CART_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

    fn cart_service() -> (CartService, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let service = CartService::new(cache.clone(), CART_TTL);
        (service, cache)
    }

    fn anonymous() -> CartIdentity {
        CartIdentity::Session {
            id: "session-1".to_owned(),
        }
    }

    fn item(product_id: i64, quantity: i64) -> CartItem {
        CartItem {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_missing_cart_reads_empty() {
        let (carts, _) = cart_service();
        let cart = carts.get(&anonymous()).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_accumulates_same_product() {
        let (carts, _) = cart_service();
        let identity = anonymous();

        carts.add(&identity, item(7, 2)).await.unwrap();
        let cart = carts.add(&identity, item(7, 3)).await.unwrap();

        assert_eq!(cart.items, vec![item(7, 5)]);
        // The stored blob agrees with the returned cart.
        assert_eq!(carts.get(&identity).await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_remove_absent_product_leaves_cart_unchanged() {
        let (carts, _) = cart_service();
        let identity = anonymous();

        carts.add(&identity, item(1, 1)).await.unwrap();
        let cart = carts.remove(&identity, 99).await.unwrap();

        assert_eq!(cart.items, vec![item(1, 1)]);
    }

    #[tokio::test]
    async fn test_remove_drops_the_line() {
        let (carts, _) = cart_service();
        let identity = anonymous();

        carts.add(&identity, item(1, 1)).await.unwrap();
        carts.add(&identity, item(2, 4)).await.unwrap();
        let cart = carts.remove(&identity, 1).await.unwrap();

        assert_eq!(cart.items, vec![item(2, 4)]);
    }

    #[tokio::test]
    async fn test_identities_do_not_share_carts() {
        let (carts, _) = cart_service();
        let session = anonymous();
        let user = CartIdentity::User {
            token: "some-token".to_owned(),
        };

        carts.add(&session, item(1, 1)).await.unwrap();

        assert!(carts.get(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_refreshes_ttl() {
        let (carts, cache) = cart_service();
        let identity = anonymous();

        carts.add(&identity, item(1, 1)).await.unwrap();
        let ttl = cache.expires_in(&identity.cache_key()).unwrap();

        assert!(ttl > CART_TTL - Duration::from_secs(60));
        assert!(ttl <= CART_TTL);
    }

    #[tokio::test]
    async fn test_corrupt_blob_reads_as_empty() {
        let (carts, cache) = cart_service();
        let identity = anonymous();
        cache
            .set(&identity.cache_key(), "not json", CART_TTL)
            .await
            .unwrap();

        let cart = carts.get(&identity).await.unwrap();
        assert!(cart.is_empty());
    }
}
