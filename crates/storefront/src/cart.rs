//! Cart and wishlist store.
//!
//! A single exclusive-writer store: consumers read through the accessor
//! methods and mutate only through the defined operations. Every mutation
//! ends with an explicit commit of the changed collection through the
//! injected [`Storage`] adapter.
//!
//! Totals and counts are derived, recomputed on every read; there is no
//! stored denormalized total that could drift from the contents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumiere_core::ProductId;

use crate::commerce::types::Product;
use crate::storage::{self, Storage, StorageError, keys};

/// Errors from cart and wishlist operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities below 1 are rejected; use `remove_from_cart` to delete.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// Committing a collection to storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A cart line: a product snapshot with a positive quantity.
///
/// At most one `CartItem` exists per product ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Snapshot of the product at the time it was added.
    pub product: Product,
    /// Units selected; always >= 1.
    pub quantity: u32,
}

/// Cart and wishlist collections with persistence.
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    storage: S,
    cart: Vec<CartItem>,
    wishlist: Vec<Product>,
}

impl<S: Storage> CartStore<S> {
    /// Restore a store from persisted state.
    ///
    /// Missing or corrupt collections initialize empty (corruption is logged
    /// by the storage layer, never surfaced as an error).
    pub fn restore(storage: S) -> Self {
        let cart = storage::load_json(&storage, keys::CART).unwrap_or_default();
        let wishlist = storage::load_json(&storage, keys::WISHLIST).unwrap_or_default();
        Self {
            storage,
            cart,
            wishlist,
        }
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Add `quantity` units of a product to the cart.
    ///
    /// Merges into the existing entry for the same product ID if present -
    /// the cart never holds two entries for one product. A merge that would
    /// exceed `u32::MAX` saturates there.
    ///
    /// # Errors
    ///
    /// Rejects `quantity == 0` with [`CartError::InvalidQuantity`]; fails if
    /// the commit cannot be persisted.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if let Some(item) = self.cart.iter_mut().find(|item| item.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
        } else {
            self.cart.push(CartItem { product, quantity });
        }
        self.commit_cart()
    }

    /// Remove a product's entry from the cart; no-op if absent.
    ///
    /// # Errors
    ///
    /// Fails only if the commit cannot be persisted.
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Result<(), CartError> {
        self.cart.retain(|item| item.product.id != product_id);
        self.commit_cart()
    }

    /// Replace an entry's quantity exactly.
    ///
    /// # Errors
    ///
    /// Rejects `quantity < 1` with [`CartError::InvalidQuantity`], leaving
    /// the cart unchanged - deletion must go through
    /// [`CartStore::remove_from_cart`]. Fails if the commit cannot be
    /// persisted.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if let Some(item) = self.cart.iter_mut().find(|item| item.product.id == product_id) {
            item.quantity = quantity;
        }
        self.commit_cart()
    }

    /// Empty the cart unconditionally.
    ///
    /// # Errors
    ///
    /// Fails only if the commit cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.commit_cart()
    }

    // =========================================================================
    // Wishlist Operations
    // =========================================================================

    /// Toggle a product in or out of the wishlist.
    ///
    /// Membership is keyed by product ID; applying the toggle twice restores
    /// the original wishlist.
    ///
    /// # Errors
    ///
    /// Fails only if the commit cannot be persisted.
    pub fn toggle_wishlist(&mut self, product: Product) -> Result<(), CartError> {
        if self.is_in_wishlist(product.id) {
            self.wishlist.retain(|p| p.id != product.id);
        } else {
            self.wishlist.push(product);
        }
        self.commit_wishlist()
    }

    /// Whether a product is in the wishlist.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.wishlist.iter().any(|p| p.id == product_id)
    }

    // =========================================================================
    // Derived Values & Accessors
    // =========================================================================

    /// Current cart entries.
    #[must_use]
    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    /// Current wishlist entries.
    #[must_use]
    pub fn wishlist(&self) -> &[Product] {
        &self.wishlist
    }

    /// Sum of `price x quantity` over all entries, recomputed on every call.
    ///
    /// Entries whose price does not parse contribute zero rather than
    /// poisoning the total.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.cart
            .iter()
            .map(|item| item.product.price.amount_or_zero() * Decimal::from(item.quantity))
            .sum()
    }

    /// Sum of quantities over all entries, recomputed on every call.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.cart
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn commit_cart(&self) -> Result<(), CartError> {
        storage::store_json(&self.storage, keys::CART, &self.cart)?;
        Ok(())
    }

    fn commit_wishlist(&self) -> Result<(), CartError> {
        storage::store_json(&self.storage, keys::WISHLIST, &self.wishlist)?;
        Ok(())
    }
}
