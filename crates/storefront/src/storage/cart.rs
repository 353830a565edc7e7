//! Cart collection store.

use std::sync::Arc;

use seasons_core::{Price, ProductId};

use crate::models::{CartLine, ProductSummary};

use super::{StorageBackend, keys, read_collection, write_collection};

/// Typed accessor over the `seasons_cart` blob.
///
/// One line per product id; repeated adds accumulate quantity on the existing
/// line. Totals use retail price only.
#[derive(Clone)]
pub struct CartStore {
    backend: Arc<dyn StorageBackend>,
}

impl CartStore {
    pub(super) fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The decoded cart, or empty if storage is absent or unreadable.
    #[must_use]
    pub fn get(&self) -> Vec<CartLine> {
        read_collection(self.backend.as_ref(), keys::CART)
    }

    /// Replace the whole cart.
    pub fn set(&self, lines: &[CartLine]) -> bool {
        write_collection(self.backend.as_ref(), keys::CART, &lines)
    }

    /// Add `quantity` of `product`, merging into an existing line by id.
    ///
    /// A zero quantity is a no-op: lines never exist with quantity zero.
    pub fn add_item(&self, product: &ProductSummary, quantity: u32) -> bool {
        if quantity == 0 {
            return true;
        }
        let mut cart = self.get();
        if let Some(line) = cart.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            cart.push(CartLine::from_product(product, quantity));
        }
        self.set(&cart)
    }

    /// Remove the line for `id`, if present.
    pub fn remove_item(&self, id: ProductId) -> bool {
        let mut cart = self.get();
        cart.retain(|line| line.id != id);
        self.set(&cart)
    }

    /// Set the quantity for an existing line. Zero removes the line.
    ///
    /// Returns `false` if `id` is not in the cart.
    pub fn update_quantity(&self, id: ProductId, quantity: u32) -> bool {
        let mut cart = self.get();
        if !cart.iter().any(|line| line.id == id) {
            return false;
        }
        if quantity == 0 {
            cart.retain(|line| line.id != id);
        } else if let Some(line) = cart.iter_mut().find(|line| line.id == id) {
            line.quantity = quantity;
        }
        self.set(&cart)
    }

    /// Remove the whole cart blob.
    pub fn clear(&self) -> bool {
        self.backend.remove(keys::CART)
    }

    /// Retail total over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.get().iter().map(CartLine::subtotal).sum()
    }

    /// Total unit count over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.get().iter().map(|line| line.quantity).sum()
    }
}
