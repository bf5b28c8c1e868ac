//! Cart domain types.

use serde::{Deserialize, Serialize};

/// A single cart line.
///
/// Field names follow the wire format (`productId`), which is also the
/// shape stored in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog id of the product.
    pub product_id: i64,
    /// Number of units.
    pub quantity: i64,
}

/// An ordered list of cart lines, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    /// Lines in insertion order.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Decode a cart from its stored JSON blob (a bare array of lines).
    ///
    /// Returns `None` if the blob does not parse; the caller decides how
    /// to treat a corrupt record.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Vec<CartItem>>(raw)
            .ok()
            .map(|items| Self { items })
    }

    /// Encode the cart into its stored JSON blob.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Add `item` to the cart.
    ///
    /// If a line with the same product id already exists its quantity is
    /// increased; otherwise the item is appended. The cart never holds
    /// two lines for one product.
    pub fn upsert(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    /// Remove the line for `product_id`, if present.
    ///
    /// Only the first matching line is dropped, which also repairs a cart
    /// that somehow ended up with duplicate lines. Returns whether a line
    /// was removed.
    pub fn remove(&mut self, product_id: i64) -> bool {
        match self.items.iter().position(|line| line.product_id == product_id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
